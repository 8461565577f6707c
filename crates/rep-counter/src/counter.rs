//! 计数状态机
//!
//! 两个状态：Resting（起始姿态）→ InPosition（到达目标角）→ Resting。
//! 只有从 InPosition 回到 Resting 的那一帧才会计数；计数由当前状态门控，
//! 而不是只看瞬时角度，所以在阈值附近抖动不会重复计数。
//!
//! 左右两侧取“最有利”的一侧：任意一侧满足条件即视为整帧满足，
//! 缺失的一侧永远不满足任何条件。

use serde::{Deserialize, Serialize};

use crate::exercise::{Exercise, ExerciseConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Resting,
    InPosition,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Resting => "resting",
            Phase::InPosition => "inPosition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Feedback {
    /// Baseline, also used when the frame carries no usable signal.
    BeginRep,
    /// Resting inside the band; needs more depth / extension.
    Advance,
    Excellent,
}

impl Feedback {
    pub fn message(self, exercise: Exercise) -> &'static str {
        match self {
            Feedback::BeginRep => "Please Begin Rep!",
            Feedback::Advance => exercise.advance_prompt(),
            Feedback::Excellent => "Excellent!",
        }
    }
}

/// Result of advancing the machine by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub feedback: Feedback,
    pub rep_completed: bool,
    /// False when no side had a usable angle; the machine was left untouched.
    pub has_signal: bool,
}

/// Caller-owned rep count and phase for one exercise instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepCounter {
    rep_count: u32,
    phase: Phase,
}

impl RepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(rep_count: u32) -> Self {
        Self {
            rep_count,
            phase: Phase::Resting,
        }
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sets the count and returns to `Resting`. Ignores current angles.
    pub fn reset(&mut self, rep_count: u32) {
        self.rep_count = rep_count;
        self.phase = Phase::Resting;
    }

    /// Advances by one frame. `sides` holds one candidate angle per side.
    pub fn step(&mut self, sides: &[Option<f64>], config: &ExerciseConfig) -> Step {
        let direction = config.direction();
        let target = config.target_angle;
        let threshold = config.threshold_angle;

        let usable = || sides.iter().filter_map(|s| s.filter(|a| a.is_finite()));

        if usable().next().is_none() {
            return Step {
                feedback: Feedback::BeginRep,
                rep_completed: false,
                has_signal: false,
            };
        }

        let mut rep_completed = false;

        let feedback = if self.phase == Phase::Resting
            && usable().any(|a| direction.between(a, target, threshold))
        {
            Feedback::Advance
        } else if usable().any(|a| direction.reached(a, target)) {
            if self.phase != Phase::InPosition {
                tracing::debug!(exercise = %config.exercise, "entered target position");
            }
            self.phase = Phase::InPosition;
            Feedback::Excellent
        } else if usable().any(|a| direction.returned(a, threshold)) {
            if self.phase == Phase::InPosition {
                self.rep_count = self.rep_count.saturating_add(1);
                self.phase = Phase::Resting;
                rep_completed = true;
                Feedback::Excellent
            } else {
                Feedback::BeginRep
            }
        } else if self.phase == Phase::InPosition {
            Feedback::Excellent
        } else {
            Feedback::BeginRep
        };

        Step {
            feedback,
            rep_completed,
            has_signal: true,
        }
    }
}
