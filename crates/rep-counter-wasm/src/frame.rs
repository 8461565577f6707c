//! 关键点输入解析
//!
//! JS 侧按 `x, y, z` 三元组平铺传入，长度为 `3 × 关键点数`。
//! 任一平面坐标为 NaN 表示该关键点本帧缺失；仅 z 为 NaN 时保留平面坐标。

use rep_counter::Landmark;

pub const LANDMARK_STRIDE: usize = 3;

pub fn parse_flat_landmarks(values: &[f64]) -> Vec<Option<Landmark>> {
    values
        .chunks_exact(LANDMARK_STRIDE)
        .map(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            Some(if z.is_finite() {
                Landmark::with_z(x, y, z)
            } else {
                Landmark::new(x, y)
            })
        })
        .collect()
}
