//! 会话控制器
//!
//! 一个会话只持有一个计数状态机。每帧：测量关节角 → 推进状态机 →
//! 依次回调 角度 → 反馈 → 计数（仅在变化时）。所有修改都需要 `&mut self`，
//! 帧处理与复位因此天然串行。

use serde::Serialize;

use crate::angle::JointAngle;
use crate::counter::{Feedback, Phase, RepCounter};
use crate::exercise::{Exercise, ExerciseConfig};
use crate::landmark::Landmark;

/// Receives per-frame outputs in order: angles, feedback, then rep count
/// (the latter only when it changed).
pub trait FrameObserver {
    fn on_angles(&mut self, _angles: &[JointAngle]) {}
    fn on_feedback(&mut self, _feedback: Feedback, _message: &'static str) {}
    fn on_rep_count(&mut self, _rep_count: u32) {}
}

impl FrameObserver for () {}

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub exercise: Exercise,
    pub angles: Vec<JointAngle>,
    pub feedback: Feedback,
    pub message: &'static str,
    pub phase: Phase,
    pub rep_count: u32,
    pub rep_completed: bool,
    pub has_signal: bool,
}

#[derive(Debug, Clone)]
pub struct SessionController {
    config: ExerciseConfig,
    counter: RepCounter,
    frames_processed: u64,
    last_feedback: Feedback,
}

impl SessionController {
    pub fn new(config: ExerciseConfig) -> Self {
        warn_if_invalid(&config);
        Self {
            config,
            counter: RepCounter::new(),
            frames_processed: 0,
            last_feedback: Feedback::BeginRep,
        }
    }

    pub fn for_exercise(exercise: Exercise) -> Self {
        Self::new(ExerciseConfig::new(exercise))
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn exercise(&self) -> Exercise {
        self.config.exercise
    }

    pub fn rep_count(&self) -> u32 {
        self.counter.rep_count()
    }

    pub fn phase(&self) -> Phase {
        self.counter.phase()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn last_feedback(&self) -> Feedback {
        self.last_feedback
    }

    pub fn last_message(&self) -> &'static str {
        self.last_feedback.message(self.config.exercise)
    }

    pub fn process_frame(&mut self, frame: &[Option<Landmark>]) -> FrameOutcome {
        self.process_frame_with(frame, &mut ())
    }

    pub fn process_frame_with<O>(&mut self, frame: &[Option<Landmark>], observer: &mut O) -> FrameOutcome
    where
        O: FrameObserver + ?Sized,
    {
        let measurement = self.config.exercise.measure(frame);
        observer.on_angles(&measurement.angles);

        let step = self.counter.step(&measurement.sides, &self.config);
        let message = step.feedback.message(self.config.exercise);
        observer.on_feedback(step.feedback, message);

        if step.rep_completed {
            tracing::info!(
                exercise = %self.config.exercise,
                rep_count = self.counter.rep_count(),
                "rep completed"
            );
            observer.on_rep_count(self.counter.rep_count());
        }

        self.frames_processed += 1;
        self.last_feedback = step.feedback;

        FrameOutcome {
            frame_index: self.frames_processed,
            exercise: self.config.exercise,
            angles: measurement.angles,
            feedback: step.feedback,
            message,
            phase: self.counter.phase(),
            rep_count: self.counter.rep_count(),
            rep_completed: step.rep_completed,
            has_signal: step.has_signal,
        }
    }

    /// Explicit user reset: sets the count, clears the phase.
    pub fn reset(&mut self, rep_count: u32) {
        tracing::info!(exercise = %self.config.exercise, rep_count, "session reset");
        self.counter.reset(rep_count);
        self.last_feedback = Feedback::BeginRep;
    }

    /// Drops the old state entirely; nothing carries over.
    pub fn switch_exercise(&mut self, config: ExerciseConfig) {
        tracing::info!(from = %self.config.exercise, to = %config.exercise, "exercise switched");
        *self = Self::new(config);
    }

    /// Adjusts the target without touching count or phase.
    pub fn set_target_angle(&mut self, target_angle: f64) {
        self.config.target_angle = target_angle;
        warn_if_invalid(&self.config);
    }
}

fn warn_if_invalid(config: &ExerciseConfig) {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "exercise configuration degrades rep detection");
    }
}
