//! 协议常量定义
//!
//! 默认速度（mm/min）与液体处理动作中的固定几何偏移（mm）。

/// 柱塞归零（prime）默认速度
pub const PRIME_SPEED: f64 = 2500.0;

/// 吸液/排液默认柱塞速度
pub const PLUNGER_SPEED: f64 = 2000.0;

/// transfer 中吸液/排液的默认柱塞速度
pub const TRANSFER_SPEED: f64 = 3000.0;

/// 吹出（blowout）默认速度
pub const BLOWOUT_SPEED: f64 = 3000.0;

/// 混合（mix）默认速度
pub const MIX_SPEED: f64 = 5000.0;

/// 退吸头时柱塞速度
pub const EJECT_SPEED: f64 = 4000.0;

/// 取吸头探测运动速度
pub const PROBE_SPEED: f64 = 800.0;

/// 直接对孔排液时抬高的 z 偏移，避免吸回刚排出的液滴
pub const DISPENSE_CLEARANCE: f64 = 10.0;

/// blowout 时相对孔顶部的高度
pub const BLOWOUT_HEIGHT: f64 = 5.0;

/// air gap 时相对孔顶部的高度
pub const AIR_GAP_HEIGHT: f64 = 20.0;

/// mix 开始前相对孔顶部的高度
pub const MIX_APPROACH_HEIGHT: f64 = 2.0;

/// stir 时吸头距孔底的高度
pub const STIR_BOTTOM_CLEARANCE: f64 = 0.5;

/// return_tip 时下探/回抬的距离
pub const RETURN_TIP_DEPTH: f64 = 25.0;

/// 取吸头成功后相对安全高度的额外抬升
pub const PICKUP_LIFT: f64 = 10.0;

/// stir 位置检查的小数位数
pub const POSITION_DECIMALS: i32 = 2;
