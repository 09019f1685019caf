//! 运动命令类型定义
//!
//! 平台接收到的每一条命令都可以表示为 `MotionCommand`，
//! 用于日志记录、钩子回调以及 dry-run 时输出 G-code。

use pipette_protocol::gcode::{format_number, move_words};
use pipette_protocol::{Axis, MoveTarget, RawCommand};
use std::fmt;

/// 运动命令
#[derive(Debug, Clone, PartialEq)]
pub enum MotionCommand {
    /// 绝对运动
    MoveTo(MoveTarget),
    /// 相对运动
    MoveRelative(MoveTarget),
    /// 回撤到安全高度（`z` 为回撤后的高度）
    RetractToSafeHeight { z: f64 },
    /// 原始命令
    Raw(RawCommand),
    /// 等待运动完成
    WaitForMotionComplete,
}

impl MotionCommand {
    /// 是否涉及柱塞轴
    pub fn moves_plunger(&self) -> bool {
        match self {
            MotionCommand::MoveTo(t) | MotionCommand::MoveRelative(t) => t.v.is_some(),
            _ => false,
        }
    }

    /// 绝对运动中某轴的目标值
    pub fn absolute(&self, axis: Axis) -> Option<f64> {
        match self {
            MotionCommand::MoveTo(t) => t.get(axis),
            _ => None,
        }
    }

    /// 相对运动中某轴的增量
    pub fn relative(&self, axis: Axis) -> Option<f64> {
        match self {
            MotionCommand::MoveRelative(t) => t.get(axis),
            _ => None,
        }
    }

    /// 是否为探测运动
    pub fn is_probe(&self) -> bool {
        matches!(self, MotionCommand::MoveTo(t) if t.probe)
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionCommand::MoveTo(target) => write!(f, "G1 {}", move_words(target)),
            MotionCommand::MoveRelative(delta) => {
                write!(f, "G91\nG1 {}\nG90", move_words(delta))
            },
            MotionCommand::RetractToSafeHeight { z } => write!(f, "G0 Z{}", format_number(*z)),
            MotionCommand::Raw(raw) => write!(f, "{raw}"),
            MotionCommand::WaitForMotionComplete => f.write_str("M400"),
        }
    }
}
