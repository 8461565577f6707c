//! 动作定义
//!
//! 每种动作给出：运动方向、默认目标角、复位阈值角、提示文案，以及从一帧
//! 关键点中提取哪些关节角（见 `measure`）。

mod measure;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use measure::Measurement;

use crate::landmark::Landmark;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),
    #[error("angle {value} is outside [0, 180]")]
    AngleOutOfRange { value: f64 },
    #[error(
        "invalid configuration for {exercise}: target {target} must lie beyond threshold {threshold}"
    )]
    InvalidConfiguration {
        exercise: Exercise,
        target: f64,
        threshold: f64,
    },
}

/// Which way the tracked angle moves to reach the target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Angle closes towards the target (squat depth, push-up, curl).
    Flexion,
    /// Angle opens towards the target (dead bug flattening).
    Extension,
}

impl Direction {
    /// Passed beyond the target.
    pub fn reached(self, angle: f64, target: f64) -> bool {
        match self {
            Direction::Flexion => angle < target,
            Direction::Extension => angle > target,
        }
    }

    /// Returned beyond the start threshold.
    pub fn returned(self, angle: f64, threshold: f64) -> bool {
        match self {
            Direction::Flexion => angle > threshold,
            Direction::Extension => angle < threshold,
        }
    }

    /// Strictly inside the band between threshold and target.
    pub fn between(self, angle: f64, target: f64, threshold: f64) -> bool {
        match self {
            Direction::Flexion => angle < threshold && angle > target,
            Direction::Extension => angle > threshold && angle < target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Squat,
    DeadBug,
    PushUp,
    BicepCurl,
}

impl Exercise {
    pub const ALL: [Exercise; 4] = [
        Exercise::Squat,
        Exercise::DeadBug,
        Exercise::PushUp,
        Exercise::BicepCurl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::DeadBug => "dead_bug",
            Exercise::PushUp => "push_up",
            Exercise::BicepCurl => "bicep_curl",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Exercise::Squat => "Squat",
            Exercise::DeadBug => "Dead Bug",
            Exercise::PushUp => "Push-Up",
            Exercise::BicepCurl => "Bicep Curl",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Exercise::DeadBug => Direction::Extension,
            Exercise::Squat | Exercise::PushUp | Exercise::BicepCurl => Direction::Flexion,
        }
    }

    /// Default "full depth" / "flat" angle. User adjustable per session.
    pub fn default_target_angle(self) -> f64 {
        match self {
            Exercise::Squat => 70.0,
            Exercise::DeadBug => 140.0,
            Exercise::PushUp => 90.0,
            Exercise::BicepCurl => 45.0,
        }
    }

    /// Fixed "returned to start" angle.
    pub fn threshold_angle(self) -> f64 {
        match self {
            Exercise::Squat => 160.0,
            Exercise::DeadBug => 100.0,
            Exercise::PushUp => 160.0,
            Exercise::BicepCurl => 150.0,
        }
    }

    /// Prompt shown while resting inside the band without having reached the target.
    pub fn advance_prompt(self) -> &'static str {
        match self {
            Exercise::Squat | Exercise::PushUp => "Go Down Lower!",
            Exercise::DeadBug => "Extend Further!",
            Exercise::BicepCurl => "Curl Higher!",
        }
    }

    pub fn measure(self, frame: &[Option<Landmark>]) -> Measurement {
        measure::measure(self, frame)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Exercise::ALL
            .into_iter()
            .find(|e| e.as_str() == normalized || e.as_str().replace('_', "") == normalized)
            .ok_or_else(|| ConfigError::UnknownExercise(s.to_string()))
    }
}

/// Per-session exercise parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub exercise: Exercise,
    pub target_angle: f64,
    pub threshold_angle: f64,
}

impl ExerciseConfig {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            target_angle: exercise.default_target_angle(),
            threshold_angle: exercise.threshold_angle(),
        }
    }

    pub fn with_target(exercise: Exercise, target_angle: f64) -> Self {
        Self {
            target_angle,
            ..Self::new(exercise)
        }
    }

    pub fn direction(&self) -> Direction {
        self.exercise.direction()
    }

    /// The state machine accepts any configuration; this check is for callers
    /// that want to refuse a target that leaves no band before the threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for value in [self.target_angle, self.threshold_angle] {
            if !value.is_finite() || !(0.0..=180.0).contains(&value) {
                return Err(ConfigError::AngleOutOfRange { value });
            }
        }

        let ordered = match self.direction() {
            Direction::Flexion => self.target_angle < self.threshold_angle,
            Direction::Extension => self.target_angle > self.threshold_angle,
        };
        if !ordered {
            return Err(ConfigError::InvalidConfiguration {
                exercise: self.exercise,
                target: self.target_angle,
                threshold: self.threshold_angle,
            });
        }
        Ok(())
    }
}
