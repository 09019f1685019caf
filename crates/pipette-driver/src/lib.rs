//! 驱动层模块
//!
//! 本模块定义移液器工具与运动平台之间的接口，包括：
//! - `MotionController`：绝对/相对运动、位置读取、安全高度回撤、原始命令
//! - `ToolActivation`：平台当前激活的工具
//! - 运动命令日志类型（可渲染为 G-code）
//! - 钩子系统：命令发送后的自定义回调
//! - `SimulatedController`：内存中的运动平台（测试与 dry-run 使用）
//!
//! # 使用场景
//!
//! 真实硬件的运输层由平台方实现这两个 trait。
//! 大多数用户应该使用 `pipette-client` 提供的 `Pipette` 接口。

pub mod command;
mod controller;
mod error;
pub mod hooks;
pub mod recording;
pub mod sim;

pub use command::MotionCommand;
pub use controller::{MotionController, ToolActivation};
pub use error::DriverError;
pub use hooks::{CommandCallback, HookManager};
pub use recording::RecordingHook;
pub use sim::SimulatedController;
