//! 原始命令（G-code 文本）
//!
//! 运动控制器的底层命令通道只接受文本。本模块负责把液体处理中
//! 用到的少数原始命令（圆弧、工具偏移）以及运动目标格式化为 G-code。

use crate::motion::MoveTarget;
use std::fmt;

/// 数字输出保留的最大小数位
const FLOAT_DIGITS: usize = 3;

/// 圆弧方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

impl ArcDirection {
    fn code(self) -> &'static str {
        match self {
            ArcDirection::Clockwise => "G2",
            ArcDirection::CounterClockwise => "G3",
        }
    }
}

/// 原始命令
#[derive(Debug, Clone, PartialEq)]
pub enum RawCommand {
    /// 圆弧运动
    ///
    /// `i`/`j` 为圆心相对起点的偏移；`z` 给出时为螺旋抬升的终点高度。
    Arc {
        direction: ArcDirection,
        x: f64,
        y: f64,
        z: Option<f64>,
        i: f64,
        j: f64,
    },

    /// 设置工具 z 偏移（G10 P{tool} Z{z}）
    SetToolOffset { tool: u8, z: f64 },

    /// 任意文本命令
    Text(String),
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCommand::Arc {
                direction,
                x,
                y,
                z,
                i,
                j,
            } => {
                write!(
                    f,
                    "{} X{} Y{}",
                    direction.code(),
                    format_number(*x),
                    format_number(*y)
                )?;
                if let Some(z) = z {
                    write!(f, " Z{}", format_number(*z))?;
                }
                write!(f, " I{} J{}", format_number(*i), format_number(*j))
            },
            RawCommand::SetToolOffset { tool, z } => {
                write!(f, "G10 P{} Z{}", tool, format_number(*z))
            },
            RawCommand::Text(text) => f.write_str(text),
        }
    }
}

/// 把运动目标格式化为 G-code 参数字（不含 G0/G1 前缀）
///
/// ```rust
/// use pipette_protocol::{MoveTarget, gcode::move_words};
///
/// let target = MoveTarget::z(12.5).with_speed(800.0).probing();
/// assert_eq!(move_words(&target), "Z12.5 F800 H4");
/// ```
pub fn move_words(target: &MoveTarget) -> String {
    let mut words: Vec<String> = target
        .axes()
        .map(|(axis, value)| format!("{}{}", axis.letter(), format_number(value)))
        .collect();
    if let Some(speed) = target.speed {
        words.push(format!("F{}", format_number(speed)));
    }
    if target.probe {
        words.push("H4".to_string());
    }
    words.join(" ")
}

/// 数字格式化：最多 3 位小数，去掉多余的 0
pub fn format_number(value: f64) -> String {
    let text = format!("{:.*}", FLOAT_DIGITS, value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-4.1666666), "-4.167");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_arc_display() {
        let arc = RawCommand::Arc {
            direction: ArcDirection::Clockwise,
            x: 100.0,
            y: 50.25,
            z: None,
            i: -2.0,
            j: 0.0,
        };
        assert_eq!(arc.to_string(), "G2 X100 Y50.25 I-2 J0");

        let helix = RawCommand::Arc {
            direction: ArcDirection::CounterClockwise,
            x: 1.0,
            y: 2.0,
            z: Some(3.5),
            i: -1.0,
            j: 0.0,
        };
        assert_eq!(helix.to_string(), "G3 X1 Y2 Z3.5 I-1 J0");
    }

    #[test]
    fn test_tool_offset_display() {
        let cmd = RawCommand::SetToolOffset { tool: 2, z: -62.4 };
        assert_eq!(cmd.to_string(), "G10 P2 Z-62.4");
    }

    #[test]
    fn test_move_words() {
        assert_eq!(move_words(&MoveTarget::xy(1.0, 2.0)), "X1 Y2");
        assert_eq!(
            move_words(&MoveTarget::plunger(-5.0).with_speed(2000.0)),
            "V-5 F2000"
        );
    }
}
