//! 客户端接口模块
//!
//! 本模块提供移液器工具的用户接口，包括：
//! - 状态机（是否装吸头、是否归零、当前所在孔）
//! - 液体处理（吸液、排液、转移、吹出、空气隙、混合、搅拌）
//! - 吸头更换（拾取、丢弃、归还、z 偏移补偿）
//! - 吸头库存与耗材坐标解析
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的模块。运动平台和耗材目录以 trait 注入，
//! 测试和 dry-run 可以使用 `pipette_driver::SimulatedController` 和 [`labware::Deck`]。

pub mod builder;
pub mod cancel;
pub mod inventory;
pub mod labware;
mod liquid;
pub mod state;
mod tips;
pub mod types;

// 重新导出常用类型
pub use builder::PipetteBuilder;
pub use cancel::CancellationToken;
pub use inventory::{InventoryExhausted, TipInventory, TipRack};
pub use labware::{LabwareDirectory, LabwareError, Location, WellGeometry, WellRef};
pub use state::{Pipette, PipetteState};
pub use types::*;
