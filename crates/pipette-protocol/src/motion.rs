//! 运动类型定义
//!
//! 轴、三维坐标点、当前位置与运动目标。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 运动平台的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    /// 移液器柱塞轴
    V,
}

impl Axis {
    /// 全部轴（G-code 输出顺序）
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::V];

    /// G-code 中的轴字母
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::V => 'V',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// 甲板坐标系中的点（mm）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 沿 z 方向平移
    pub fn raised(self, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            ..self
        }
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

/// 运动平台当前位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub v: f64,
}

impl Position {
    /// 读取单轴位置
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::V => self.v,
        }
    }

    /// 设置单轴位置
    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
            Axis::V => self.v = value,
        }
    }
}

/// 运动目标
///
/// 每个轴可选；未给出的轴保持不动。同一结构既用于绝对运动
/// （`move_to`），也用于相对运动（`move_relative`，此时各值为增量）。
///
/// # 示例
///
/// ```rust
/// use pipette_protocol::{Axis, MoveTarget};
///
/// let target = MoveTarget::xy(10.0, 20.0);
/// assert_eq!(target.get(Axis::X), Some(10.0));
/// assert_eq!(target.get(Axis::Z), None);
///
/// let plunger = MoveTarget::plunger(-5.0).with_speed(2000.0);
/// assert_eq!(plunger.speed, Some(2000.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub v: Option<f64>,
    /// 进给速度（mm/min），None 表示使用控制器当前速度
    pub speed: Option<f64>,
    /// 探测运动：运动中监测吸头传感器，触发即停止
    pub probe: bool,
}

impl MoveTarget {
    /// 水平运动
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// 竖直运动
    pub fn z(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    /// 柱塞运动
    pub fn plunger(v: f64) -> Self {
        Self {
            v: Some(v),
            ..Self::default()
        }
    }

    /// 指定速度
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// 标记为探测运动
    pub fn probing(mut self) -> Self {
        self.probe = true;
        self
    }

    /// 读取单轴目标
    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::V => self.v,
        }
    }

    /// 给出的轴及其值（按 X/Y/Z/V 顺序）
    pub fn axes(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(|axis| self.get(axis).map(|value| (axis, value)))
    }

    /// 是否没有任何轴
    pub fn is_empty(&self) -> bool {
        self.axes().next().is_none()
    }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
