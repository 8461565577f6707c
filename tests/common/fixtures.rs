use serde_json::{json, Value};

const LANDMARK_COUNT: usize = 33;
const LEFT_SHOULDER: usize = 11;
const RIGHT_SHOULDER: usize = 12;
const LEFT_ELBOW: usize = 13;
const RIGHT_ELBOW: usize = 14;
const LEFT_WRIST: usize = 15;
const RIGHT_WRIST: usize = 16;
const LEFT_HIP: usize = 23;
const RIGHT_HIP: usize = 24;
const LEFT_KNEE: usize = 25;
const RIGHT_KNEE: usize = 26;
const LEFT_ANKLE: usize = 27;
const RIGHT_ANKLE: usize = 28;

/// 三个点组成给定角度：a 在顶点正上方，c 按角度绕顶点旋转
fn place_joint(frame: &mut [Value], a: usize, vertex: usize, c: usize, x: f64, degrees: f64) {
    let rad = degrees.to_radians();
    frame[a] = json!({ "x": x, "y": 0.3, "visibility": 0.99 });
    frame[vertex] = json!({ "x": x, "y": 0.5, "visibility": 0.99 });
    frame[c] = json!({
        "x": x + 0.2 * rad.sin(),
        "y": 0.5 - 0.2 * rad.cos(),
        "visibility": 0.99,
    });
}

fn empty_frame() -> Vec<Value> {
    vec![Value::Null; LANDMARK_COUNT]
}

/// 深蹲帧：两侧膝角相同；`None` 表示该侧缺失
pub fn squat_landmarks(left: Option<f64>, right: Option<f64>) -> Value {
    let mut frame = empty_frame();
    if let Some(deg) = left {
        place_joint(&mut frame, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, 0.4, deg);
    }
    if let Some(deg) = right {
        place_joint(&mut frame, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, 0.6, deg);
    }
    Value::Array(frame)
}

pub fn squat_frame(degrees: f64) -> Value {
    json!({ "landmarks": squat_landmarks(Some(degrees), Some(degrees)) })
}

pub fn sequenced_squat_frame(sequence: u64, degrees: f64) -> Value {
    json!({
        "sequence": sequence,
        "landmarks": squat_landmarks(Some(degrees), Some(degrees)),
    })
}

/// 二头弯举帧：两侧肘角相同
pub fn curl_frame(degrees: f64) -> Value {
    let mut frame = empty_frame();
    place_joint(&mut frame, LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, 0.4, degrees);
    place_joint(&mut frame, RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, 0.6, degrees);
    json!({ "landmarks": frame })
}

pub const FULL_SQUAT: [f64; 5] = [170.0, 120.0, 65.0, 120.0, 170.0];
pub const SHALLOW_SQUAT: [f64; 3] = [170.0, 100.0, 170.0];
