//! 实时动作计数核心库
//!
//! 输入为外部姿态估计模型产生的人体关键点序列，输出关节角、动作反馈文案与
//! 重复次数。不涉及视频采集、模型推理、渲染或持久化。
//!
//! ## 模块
//! - `landmark`: 关键点与 MediaPipe Pose 序号
//! - `angle`: 三点夹角计算
//! - `exercise`: 动作定义（方向、阈值、提示文案、关节选取）
//! - `counter`: 带迟滞的计数状态机
//! - `session`: 会话控制器（生命周期、回调分发）

pub mod angle;
pub mod counter;
pub mod exercise;
pub mod landmark;
pub mod session;

pub use angle::{calculate_angle, calculate_angle_3d, GeometryError, JointAngle};
pub use counter::{Feedback, Phase, RepCounter};
pub use exercise::{ConfigError, Direction, Exercise, ExerciseConfig, Measurement};
pub use landmark::Landmark;
pub use session::{FrameObserver, FrameOutcome, SessionController};
