//! 关节角度计算
//!
//! 以中间点为顶点，使用向量点积求夹角：
//! cos(θ) = (v1 · v2) / (|v1| × |v2|)
//!
//! 结果为角度制，范围 [0, 180]。

use serde::Serialize;
use thiserror::Error;

use crate::landmark::{landmark_at, Landmark};

/// 向量长度低于此值视为退化（顶点与端点重合）
const MIN_VECTOR_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("landmark {index} is missing from the frame")]
    MissingLandmark { index: usize },
    #[error("landmark has non-finite coordinates")]
    NonFiniteCoordinate,
    #[error("vertex coincides with an endpoint; angle is undefined")]
    DegenerateGeometry,
}

/// Whether depth takes part in the angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    #[default]
    Planar,
    /// Uses `z` when all three points carry it, otherwise falls back to planar.
    Spatial,
}

/// Three landmark indices; the angle is measured at `vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joint {
    pub name: &'static str,
    pub a: usize,
    pub vertex: usize,
    pub c: usize,
}

impl Joint {
    pub const fn new(name: &'static str, a: usize, vertex: usize, c: usize) -> Self {
        Self {
            name,
            a,
            vertex,
            c,
        }
    }

    /// Looks the three points up in `frame` and measures the angle.
    pub fn measure(&self, frame: &[Option<Landmark>], mode: AngleMode) -> Result<f64, GeometryError> {
        let a = landmark_at(frame, self.a)?;
        let vertex = landmark_at(frame, self.vertex)?;
        let c = landmark_at(frame, self.c)?;
        match mode {
            AngleMode::Planar => calculate_angle(a, vertex, c),
            AngleMode::Spatial => calculate_angle_3d(a, vertex, c),
        }
    }
}

/// A published joint angle. `degrees` is `None` when the frame gave no usable
/// signal for this joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngle {
    pub joint: &'static str,
    pub degrees: Option<f64>,
}

/// Planar angle at `vertex` in degrees.
pub fn calculate_angle(a: &Landmark, vertex: &Landmark, c: &Landmark) -> Result<f64, GeometryError> {
    angle_between(
        [a.x - vertex.x, a.y - vertex.y, 0.0],
        [c.x - vertex.x, c.y - vertex.y, 0.0],
    )
}

/// Spatial angle at `vertex`. Points without depth are measured in the plane.
pub fn calculate_angle_3d(a: &Landmark, vertex: &Landmark, c: &Landmark) -> Result<f64, GeometryError> {
    match (a.z, vertex.z, c.z) {
        (Some(az), Some(vz), Some(cz)) => angle_between(
            [a.x - vertex.x, a.y - vertex.y, az - vz],
            [c.x - vertex.x, c.y - vertex.y, cz - vz],
        ),
        _ => calculate_angle(a, vertex, c),
    }
}

/// Sentinel form of [`calculate_angle`]: any missing point or undefined angle
/// yields `NaN`.
pub fn angle_or_nan(a: Option<&Landmark>, vertex: Option<&Landmark>, c: Option<&Landmark>) -> f64 {
    match (a, vertex, c) {
        (Some(a), Some(vertex), Some(c)) => calculate_angle(a, vertex, c).unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// 按最大分量缩放，避免大坐标在平方时溢出；返回缩放后的向量与原长度
fn scaled(v: [f64; 3]) -> ([f64; 3], f64) {
    let scale = v.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale == 0.0 {
        return (v, 0.0);
    }
    let u = [v[0] / scale, v[1] / scale, v[2] / scale];
    let len = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
    (u, len * scale)
}

fn angle_between(v1: [f64; 3], v2: [f64; 3]) -> Result<f64, GeometryError> {
    if v1.iter().chain(v2.iter()).any(|c| !c.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    let (u1, mag1) = scaled(v1);
    let (u2, mag2) = scaled(v2);

    if mag1 < MIN_VECTOR_LENGTH || mag2 < MIN_VECTOR_LENGTH {
        return Err(GeometryError::DegenerateGeometry);
    }

    let dot = u1[0] * u2[0] + u1[1] * u2[1] + u1[2] * u2[2];
    let norm = (u1[0] * u1[0] + u1[1] * u1[1] + u1[2] * u1[2]).sqrt()
        * (u2[0] * u2[0] + u2[1] * u2[1] + u2[2] * u2[2]).sqrt();

    // 浮点误差可能让 |cos| 略大于 1
    let cos_angle = (dot / norm).clamp(-1.0, 1.0);
    if !cos_angle.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    Ok(cos_angle.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_are_straight() {
        let a = Landmark::new(0.0, 0.0);
        let v = Landmark::new(0.5, 0.0);
        let c = Landmark::new(1.0, 0.0);
        let angle = calculate_angle(&a, &v, &c).unwrap();
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn right_angle_is_ninety() {
        let a = Landmark::new(0.0, 0.0);
        let v = Landmark::new(0.5, 0.0);
        let c = Landmark::new(0.5, 0.5);
        let angle = calculate_angle(&a, &v, &c).unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn folded_points_are_zero() {
        let a = Landmark::new(1.0, 1.0);
        let v = Landmark::new(0.0, 0.0);
        let c = Landmark::new(2.0, 2.0);
        let angle = calculate_angle(&a, &v, &c).unwrap();
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn coincident_vertex_is_degenerate() {
        let a = Landmark::new(0.3, 0.3);
        let v = Landmark::new(0.3, 0.3);
        let c = Landmark::new(0.9, 0.1);
        assert_eq!(calculate_angle(&a, &v, &c), Err(GeometryError::DegenerateGeometry));
        assert!(angle_or_nan(Some(&a), Some(&v), Some(&c)).is_nan());
    }

    #[test]
    fn missing_point_yields_nan_sentinel() {
        let v = Landmark::new(0.3, 0.3);
        let c = Landmark::new(0.9, 0.1);
        assert!(angle_or_nan(None, Some(&v), Some(&c)).is_nan());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let a = Landmark::new(f64::INFINITY, 0.0);
        let v = Landmark::new(0.5, 0.0);
        let c = Landmark::new(1.0, 0.0);
        assert_eq!(calculate_angle(&a, &v, &c), Err(GeometryError::NonFiniteCoordinate));
    }

    #[test]
    fn huge_finite_coordinates_stay_in_range() {
        let a = Landmark::new(1e160, 1e160);
        let v = Landmark::new(0.0, 0.0);
        let c = Landmark::new(1e160, 0.0);
        let angle = calculate_angle(&a, &v, &c).unwrap();
        assert!((angle - 45.0).abs() < 1e-6);

        let far = Landmark::new(f64::MAX, -f64::MAX);
        let angle = calculate_angle(&far, &v, &c).unwrap();
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn spatial_angle_uses_depth_when_present() {
        let a = Landmark::with_z(0.0, 0.0, 0.0);
        let v = Landmark::with_z(0.0, 0.0, 1.0);
        let c = Landmark::with_z(1.0, 0.0, 1.0);
        let spatial = calculate_angle_3d(&a, &v, &c).unwrap();
        assert!((spatial - 90.0).abs() < 1e-3);

        // 平面投影下 a 与顶点重合
        assert_eq!(calculate_angle(&a, &v, &c), Err(GeometryError::DegenerateGeometry));
    }

    #[test]
    fn spatial_falls_back_to_planar_without_depth() {
        let a = Landmark::new(0.0, 0.0);
        let v = Landmark::with_z(0.5, 0.0, 0.2);
        let c = Landmark::new(0.5, 0.5);
        let angle = calculate_angle_3d(&a, &v, &c).unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn joint_reports_first_missing_index() {
        let mut frame = vec![None; 33];
        frame[23] = Some(Landmark::new(0.5, 0.3));
        frame[25] = Some(Landmark::new(0.5, 0.5));
        let knee = Joint::new("leftKnee", 23, 25, 27);
        assert_eq!(
            knee.measure(&frame, AngleMode::Planar),
            Err(GeometryError::MissingLandmark { index: 27 })
        );

        frame[27] = Some(Landmark::new(0.5, 0.7));
        let angle = knee.measure(&frame, AngleMode::Planar).unwrap();
        assert!((angle - 180.0).abs() < 1e-3);
    }
}
