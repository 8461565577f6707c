//! 动作计数 WASM 库
//!
//! 把 `rep-counter` 的计数状态机编译为 WebAssembly，浏览器端拿到姿态
//! 关键点后直接在本地逐帧计数，无需往返服务端。
//!
//! ## 模块
//! - `frame`: 扁平 `Float64Array` 关键点解析
//! - `tracker`: 对外暴露的 `RepTracker` 类

pub mod frame;
pub mod tracker;

pub use frame::parse_flat_landmarks;
pub use tracker::RepTracker;
