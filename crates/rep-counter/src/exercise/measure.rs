use serde::Serialize;

use crate::angle::{AngleMode, Joint, JointAngle};
use crate::exercise::Exercise;
use crate::landmark::{
    Landmark, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

const LEFT_KNEE_JOINT: Joint = Joint::new("leftKnee", LEFT_HIP, LEFT_KNEE, LEFT_ANKLE);
const RIGHT_KNEE_JOINT: Joint = Joint::new("rightKnee", RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE);

const LEFT_ELBOW_JOINT: Joint = Joint::new("leftElbow", LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST);
const RIGHT_ELBOW_JOINT: Joint = Joint::new("rightElbow", RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST);

const LEFT_UNDERARM_JOINT: Joint =
    Joint::new("leftUnderarm", LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST);
const RIGHT_UNDERARM_JOINT: Joint =
    Joint::new("rightUnderarm", RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST);
const LEFT_HIP_JOINT: Joint = Joint::new("leftHip", LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE);
const RIGHT_HIP_JOINT: Joint = Joint::new("rightHip", RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE);

/// One frame's angles for an exercise.
///
/// `angles` is what gets published for display; `sides` are the candidate
/// signals the state machine evaluates, one per side. A side is `None` when
/// any landmark it needs is missing or its geometry is degenerate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub angles: Vec<JointAngle>,
    pub sides: [Option<f64>; 2],
}

impl Measurement {
    pub fn has_signal(&self) -> bool {
        self.sides.iter().any(Option::is_some)
    }
}

pub(crate) fn measure(exercise: Exercise, frame: &[Option<Landmark>]) -> Measurement {
    match exercise {
        Exercise::Squat => bilateral(frame, LEFT_KNEE_JOINT, RIGHT_KNEE_JOINT),
        Exercise::PushUp | Exercise::BicepCurl => {
            bilateral(frame, LEFT_ELBOW_JOINT, RIGHT_ELBOW_JOINT)
        }
        Exercise::DeadBug => dead_bug(frame),
    }
}

fn read(frame: &[Option<Landmark>], joint: Joint) -> JointAngle {
    let degrees = match joint.measure(frame, AngleMode::Planar) {
        Ok(angle) => Some(angle),
        Err(e) => {
            tracing::trace!(joint = joint.name, error = %e, "joint angle unavailable");
            None
        }
    };
    JointAngle {
        joint: joint.name,
        degrees,
    }
}

fn bilateral(frame: &[Option<Landmark>], left: Joint, right: Joint) -> Measurement {
    let left = read(frame, left);
    let right = read(frame, right);
    Measurement {
        sides: [left.degrees, right.degrees],
        angles: vec![left, right],
    }
}

// 死虫式：对侧手臂与腿同时伸展。每组取伸展程度较小的那个角，两者都到位才算到位。
fn dead_bug(frame: &[Option<Landmark>]) -> Measurement {
    let left_underarm = read(frame, LEFT_UNDERARM_JOINT);
    let right_underarm = read(frame, RIGHT_UNDERARM_JOINT);
    let left_hip = read(frame, LEFT_HIP_JOINT);
    let right_hip = read(frame, RIGHT_HIP_JOINT);

    let pair = |arm: &JointAngle, leg: &JointAngle| match (arm.degrees, leg.degrees) {
        (Some(a), Some(l)) => Some(a.min(l)),
        _ => None,
    };

    Measurement {
        sides: [
            pair(&left_underarm, &right_hip),
            pair(&right_underarm, &left_hip),
        ],
        angles: vec![left_underarm, right_underarm, left_hip, right_hip],
    }
}
