use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use rep_counter::{Exercise, ExerciseConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub sessions: SessionLimits,
    pub worker: WorkerConfig,
    pub exercises: ExerciseDefaults,
}

#[derive(Debug, Clone)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_timeout_secs: u64,
    pub max_sse_connections: usize,
    /// Upper bound on landmarks accepted in one frame.
    pub max_landmarks_per_frame: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout_secs: 900,
            max_sse_connections: 200,
            max_landmarks_per_frame: 64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_activity_report: bool,
}

/// Per-exercise default target angles, used when a session is created
/// without an explicit target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseDefaults {
    pub squat_target: f64,
    pub dead_bug_target: f64,
    pub push_up_target: f64,
    pub bicep_curl_target: f64,
}

impl Default for ExerciseDefaults {
    fn default() -> Self {
        Self {
            squat_target: Exercise::Squat.default_target_angle(),
            dead_bug_target: Exercise::DeadBug.default_target_angle(),
            push_up_target: Exercise::PushUp.default_target_angle(),
            bicep_curl_target: Exercise::BicepCurl.default_target_angle(),
        }
    }
}

impl ExerciseDefaults {
    pub fn target_for(&self, exercise: Exercise) -> f64 {
        match exercise {
            Exercise::Squat => self.squat_target,
            Exercise::DeadBug => self.dead_bug_target,
            Exercise::PushUp => self.push_up_target,
            Exercise::BicepCurl => self.bicep_curl_target,
        }
    }

    pub fn config_for(&self, exercise: Exercise) -> ExerciseConfig {
        ExerciseConfig::with_target(exercise, self.target_for(exercise))
    }
}

impl Config {
    pub fn from_env() -> Self {
        let limits = SessionLimits::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            sessions: SessionLimits {
                max_sessions: env_or_parse("MAX_SESSIONS", limits.max_sessions),
                idle_timeout_secs: env_or_parse(
                    "SESSION_IDLE_TIMEOUT_SECS",
                    limits.idle_timeout_secs,
                ),
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    limits.max_sse_connections,
                ),
                max_landmarks_per_frame: env_or_parse(
                    "MAX_LANDMARKS_PER_FRAME",
                    limits.max_landmarks_per_frame,
                ),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_activity_report: env_or_bool("ENABLE_ACTIVITY_REPORT_WORKER", true),
            },
            exercises: ExerciseDefaults {
                squat_target: env_exercise_target("SQUAT_TARGET_ANGLE", Exercise::Squat),
                dead_bug_target: env_exercise_target("DEAD_BUG_TARGET_ANGLE", Exercise::DeadBug),
                push_up_target: env_exercise_target("PUSH_UP_TARGET_ANGLE", Exercise::PushUp),
                bicep_curl_target: env_exercise_target(
                    "BICEP_CURL_TARGET_ANGLE",
                    Exercise::BicepCurl,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// 默认目标角须对该动作有效，否则告警并回退到内置值
fn env_exercise_target(key: &str, exercise: Exercise) -> f64 {
    let builtin = exercise.default_target_angle();
    let target = env_or_parse(key, builtin);
    match ExerciseConfig::with_target(exercise, target).validate() {
        Ok(()) => target,
        Err(err) => {
            tracing::warn!(key, value = target, error = %err, "Invalid default target, using built-in");
            builtin
        }
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
