//! # Pipette Protocol
//!
//! 移液器工具的协议层定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `config`: 移液器配置记录（加载与校验）
//! - `constants`: 协议常量（默认速度、几何偏移）
//! - `volume`: 体积 ↔ 柱塞位移换算
//! - `motion`: 轴、坐标点、运动目标
//! - `gcode`: 原始命令（G-code 文本）
//!
//! ## 坐标约定
//!
//! 所有长度单位为 mm，体积单位为 uL，速度单位为 mm/min。
//! 柱塞轴记为 `V`，龙门轴为 `X`/`Y`/`Z`。

pub mod config;
pub mod constants;
pub mod gcode;
pub mod motion;
pub mod volume;

// 重新导出常用类型
pub use config::{ConfigError, PipetteConfig, Speeds};
pub use constants::*;
pub use gcode::{ArcDirection, RawCommand};
pub use motion::{Axis, MoveTarget, Point3, Position};
pub use volume::VolumeConverter;
