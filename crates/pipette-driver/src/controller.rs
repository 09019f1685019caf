//! 运动平台接口
//!
//! 移液器只通过这两个 trait 与平台交互。所有方法都是阻塞的：
//! 返回 `Ok` 即表示平台已接受命令。

use crate::error::DriverError;
use pipette_protocol::{MoveTarget, Position, RawCommand};

/// 运动控制器
///
/// 单线程、单所有者：同一时刻只有一个调用方向平台下发命令。
pub trait MotionController {
    /// 绝对运动（未给出的轴保持不动）
    fn move_to(&mut self, target: &MoveTarget) -> Result<(), DriverError>;

    /// 相对运动（各轴值为增量）
    fn move_relative(&mut self, delta: &MoveTarget) -> Result<(), DriverError>;

    /// 读取当前位置
    fn position(&mut self) -> Result<Position, DriverError>;

    /// 水平移动前回撤到安全高度
    fn retract_to_safe_height(&mut self) -> Result<(), DriverError>;

    /// 甲板安全高度
    fn safe_height(&self) -> f64;

    /// 工具的基准 z 偏移（未装吸头时）
    fn tool_z_offset(&self, tool: u8) -> Result<f64, DriverError>;

    /// 下发原始命令（圆弧、工具偏移等）
    fn send_raw(&mut self, command: &RawCommand) -> Result<(), DriverError>;

    /// 阻塞等待所有已下发运动完成
    fn wait_for_motion_complete(&mut self) -> Result<(), DriverError>;
}

/// 工具激活状态
pub trait ToolActivation {
    /// 指定工具是否为平台当前激活的工具
    fn is_active(&self, tool: u8) -> bool;
}

impl<T: MotionController + ?Sized> MotionController for &mut T {
    fn move_to(&mut self, target: &MoveTarget) -> Result<(), DriverError> {
        (**self).move_to(target)
    }

    fn move_relative(&mut self, delta: &MoveTarget) -> Result<(), DriverError> {
        (**self).move_relative(delta)
    }

    fn position(&mut self) -> Result<Position, DriverError> {
        (**self).position()
    }

    fn retract_to_safe_height(&mut self) -> Result<(), DriverError> {
        (**self).retract_to_safe_height()
    }

    fn safe_height(&self) -> f64 {
        (**self).safe_height()
    }

    fn tool_z_offset(&self, tool: u8) -> Result<f64, DriverError> {
        (**self).tool_z_offset(tool)
    }

    fn send_raw(&mut self, command: &RawCommand) -> Result<(), DriverError> {
        (**self).send_raw(command)
    }

    fn wait_for_motion_complete(&mut self) -> Result<(), DriverError> {
        (**self).wait_for_motion_complete()
    }
}

impl<T: ToolActivation + ?Sized> ToolActivation for &mut T {
    fn is_active(&self, tool: u8) -> bool {
        (**self).is_active(tool)
    }
}
