//! 浏览器端计数器
//!
//! 每个 `RepTracker` 持有一个独立的 `SessionController`，JS 侧按帧调用
//! `processFrame`，得到与服务端 `/frames` 接口同构的结果对象。

use js_sys::Float64Array;
use rep_counter::{ConfigError, Exercise, ExerciseConfig, FrameOutcome, SessionController};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::frame::parse_flat_landmarks;

/// 供 UI 渲染动作列表
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseSummary {
    id: &'static str,
    name: &'static str,
    target_angle: f64,
    threshold_angle: f64,
}

#[wasm_bindgen]
pub struct RepTracker {
    controller: SessionController,
    last_angles: Vec<f64>,
}

impl RepTracker {
    /// 非导出构造：`target_angle` 为 NaN 时使用该动作的默认目标角
    pub fn try_new(exercise: &str, target_angle: f64) -> Result<Self, ConfigError> {
        let config = resolve(exercise, target_angle)?;
        Ok(Self {
            controller: SessionController::new(config),
            last_angles: Vec::new(),
        })
    }

    pub fn step(&mut self, landmarks: &[f64]) -> FrameOutcome {
        let frame = parse_flat_landmarks(landmarks);
        let outcome = self.controller.process_frame(&frame);
        self.last_angles = outcome
            .angles
            .iter()
            .map(|a| a.degrees.unwrap_or(f64::NAN))
            .collect();
        outcome
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    fn switch_to(&mut self, exercise: &str, target_angle: f64) -> Result<(), ConfigError> {
        let config = resolve(exercise, target_angle)?;
        self.controller.switch_exercise(config);
        self.last_angles.clear();
        Ok(())
    }
}

fn resolve(exercise: &str, target_angle: f64) -> Result<ExerciseConfig, ConfigError> {
    let exercise: Exercise = exercise.parse()?;
    let config = if target_angle.is_nan() {
        ExerciseConfig::new(exercise)
    } else {
        ExerciseConfig::with_target(exercise, target_angle)
    };
    config.validate()?;
    Ok(config)
}

#[wasm_bindgen]
impl RepTracker {
    #[wasm_bindgen(constructor)]
    pub fn new(exercise: &str, target_angle: f64) -> Result<RepTracker, JsError> {
        Self::try_new(exercise, target_angle).map_err(|e| JsError::new(&e.to_string()))
    }

    /// 输入: 扁平关键点数组 `[x0, y0, z0, x1, y1, z1, ...]`
    /// 返回: 序列化后的 FrameOutcome
    #[wasm_bindgen(js_name = "processFrame")]
    pub fn process_frame(&mut self, landmarks: &[f64]) -> JsValue {
        let outcome = self.step(landmarks);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn reset(&mut self, count: u32) {
        self.controller.reset(count);
    }

    #[wasm_bindgen(js_name = "setExercise")]
    pub fn set_exercise(&mut self, exercise: &str, target_angle: f64) -> Result<(), JsError> {
        self.switch_to(exercise, target_angle)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = "setTargetAngle")]
    pub fn set_target_angle(&mut self, target_angle: f64) -> Result<(), JsError> {
        let exercise = self.controller.exercise();
        ExerciseConfig::with_target(exercise, target_angle)
            .validate()
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.controller.set_target_angle(target_angle);
        Ok(())
    }

    #[wasm_bindgen(js_name = "getRepCount")]
    pub fn get_rep_count(&self) -> u32 {
        self.controller.rep_count()
    }

    /// "resting" 或 "inPosition"
    #[wasm_bindgen(js_name = "getPhase")]
    pub fn get_phase(&self) -> String {
        self.controller.phase().as_str().to_string()
    }

    #[wasm_bindgen(js_name = "getExercise")]
    pub fn get_exercise(&self) -> String {
        self.controller.exercise().as_str().to_string()
    }

    #[wasm_bindgen(js_name = "getTargetAngle")]
    pub fn get_target_angle(&self) -> f64 {
        self.controller.config().target_angle
    }

    #[wasm_bindgen(js_name = "getFeedback")]
    pub fn get_feedback(&self) -> String {
        self.controller.last_message().to_string()
    }

    /// 上一帧各关节角度，缺失为 NaN
    #[wasm_bindgen(js_name = "getLastAngles")]
    pub fn get_last_angles(&self) -> Float64Array {
        Float64Array::from(self.last_angles.as_slice())
    }

    /// 支持的动作及默认参数
    #[wasm_bindgen(js_name = "listExercises")]
    pub fn list_exercises() -> JsValue {
        let items: Vec<ExerciseSummary> = Exercise::ALL
            .iter()
            .map(|&e| ExerciseSummary {
                id: e.as_str(),
                name: e.display_name(),
                target_angle: e.default_target_angle(),
                threshold_angle: e.threshold_angle(),
            })
            .collect();
        serde_wasm_bindgen::to_value(&items).unwrap_or(JsValue::NULL)
    }
}

#[cfg(test)]
mod tests {
    use rep_counter::landmark::{LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE};
    use rep_counter::Phase;

    use super::*;

    fn squat_flat(degrees: f64) -> Vec<f64> {
        let mut flat = vec![f64::NAN; 33 * 3];
        let rad = degrees.to_radians();
        for (hip, knee, ankle, x) in [
            (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, 0.4),
            (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, 0.6),
        ] {
            flat[hip * 3..hip * 3 + 3].copy_from_slice(&[x, 0.3, 0.0]);
            flat[knee * 3..knee * 3 + 3].copy_from_slice(&[x, 0.5, 0.0]);
            flat[ankle * 3..ankle * 3 + 3]
                .copy_from_slice(&[x + 0.2 * rad.sin(), 0.5 - 0.2 * rad.cos(), 0.0]);
        }
        flat
    }

    #[test]
    fn counts_a_squat_from_flat_frames() {
        let mut tracker = RepTracker::try_new("squat", f64::NAN).unwrap();
        for angle in [170.0, 120.0, 65.0, 120.0, 170.0] {
            tracker.step(&squat_flat(angle));
        }
        assert_eq!(tracker.get_rep_count(), 1);
        assert_eq!(tracker.get_phase(), "resting");
        assert_eq!(tracker.last_angles.len(), 2);
        assert!((tracker.last_angles[0] - 170.0).abs() < 1e-6);
    }

    #[test]
    fn all_nan_frame_keeps_phase() {
        let mut tracker = RepTracker::try_new("squat", 70.0).unwrap();
        tracker.step(&squat_flat(60.0));
        let outcome = tracker.step(&vec![f64::NAN; 99]);
        assert!(!outcome.has_signal);
        assert_eq!(tracker.controller().phase(), Phase::InPosition);
        assert!(tracker.last_angles.iter().all(|a| a.is_nan()));
    }

    #[test]
    fn reset_and_switch() {
        let mut tracker = RepTracker::try_new("squat", f64::NAN).unwrap();
        for angle in [170.0, 65.0, 170.0] {
            tracker.step(&squat_flat(angle));
        }
        tracker.reset(0);
        assert_eq!(tracker.get_rep_count(), 0);

        tracker.switch_to("dead-bug", f64::NAN).unwrap();
        assert_eq!(tracker.get_exercise(), "dead_bug");
        assert_eq!(tracker.get_target_angle(), 140.0);
        assert_eq!(tracker.get_feedback(), "Please Begin Rep!");
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            RepTracker::try_new("plank", f64::NAN),
            Err(ConfigError::UnknownExercise(_))
        ));
        assert!(RepTracker::try_new("squat", 170.0).is_err());
    }
}
