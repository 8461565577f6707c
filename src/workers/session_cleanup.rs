use std::time::Duration;

use crate::registry::SessionRegistry;

pub async fn run(registry: &SessionRegistry, idle_timeout: Duration) -> usize {
    tracing::debug!("session_cleanup: start");
    let evicted = registry.evict_idle(idle_timeout).await;
    if evicted > 0 {
        tracing::info!(
            evicted,
            idle_timeout_secs = idle_timeout.as_secs(),
            "session_cleanup: evicted idle sessions"
        );
    } else {
        tracing::debug!("session_cleanup: nothing to evict");
    }
    evicted
}

#[cfg(test)]
mod tests {
    use rep_counter::{Exercise, ExerciseConfig};

    use super::*;
    use crate::config::SessionLimits;

    #[tokio::test]
    async fn keeps_recent_sessions() {
        let registry = SessionRegistry::new(SessionLimits::default());
        registry.create(ExerciseConfig::new(Exercise::Squat)).await.unwrap();

        assert_eq!(run(&registry, Duration::from_secs(900)).await, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn zero_timeout_evicts_everything_idle() {
        let registry = SessionRegistry::new(SessionLimits::default());
        registry.create(ExerciseConfig::new(Exercise::Squat)).await.unwrap();
        registry.create(ExerciseConfig::new(Exercise::DeadBug)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(run(&registry, Duration::ZERO).await, 2);
        assert!(registry.is_empty().await);
    }
}
