//! 人体关键点
//!
//! 关键点序号沿用 MediaPipe Pose 的 33 点编号。核心逻辑只按固定序号读取，
//! 从不修改输入帧。

use serde::{Deserialize, Serialize};

use crate::angle::GeometryError;

/// Number of landmarks emitted by the reference pose model.
pub const POSE_LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// 单个关键点（归一化坐标）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// 相对深度，部分模型不提供
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            visibility: None,
        }
    }

    /// True when the planar coordinates (and depth, if present) are all finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// Reads a landmark by index. Out-of-range, empty and non-finite slots are all
/// reported as missing.
pub fn landmark_at(frame: &[Option<Landmark>], index: usize) -> Result<&Landmark, GeometryError> {
    match frame.get(index) {
        Some(Some(lm)) if lm.is_finite() => Ok(lm),
        _ => Err(GeometryError::MissingLandmark { index }),
    }
}
