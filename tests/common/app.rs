use std::sync::Arc;

use axum::Router;
use tokio::sync::broadcast;

use rep_tracker_backend::config::{Config, ExerciseDefaults, SessionLimits, WorkerConfig};
use rep_tracker_backend::registry::SessionRegistry;
use rep_tracker_backend::routes::build_router;
use rep_tracker_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    pub shutdown_tx: broadcast::Sender<()>,
}

// 直接构造 Config，避免 set_var 在多线程测试中的竞态
fn test_config(limits: SessionLimits) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        sessions: limits,
        worker: WorkerConfig {
            is_leader: false,
            enable_activity_report: false,
        },
        exercises: ExerciseDefaults::default(),
    }
}

pub async fn spawn_with_limits(limits: SessionLimits) -> TestApp {
    let config = test_config(limits);
    let registry = Arc::new(SessionRegistry::new(config.sessions.clone()));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(registry, &config, shutdown_tx.clone());
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        shutdown_tx,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_limits(SessionLimits::default()).await
}
