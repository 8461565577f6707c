use crate::registry::{RegistryStats, SessionRegistry};

/// 周期性输出会话活跃度，供日志侧聚合
pub async fn run(registry: &SessionRegistry) -> RegistryStats {
    let stats = registry.stats().await;
    tracing::info!(
        active_sessions = stats.active_sessions,
        in_position = stats.in_position,
        total_reps = stats.total_reps,
        frames_processed = stats.frames_processed,
        "activity_report"
    );
    stats
}
