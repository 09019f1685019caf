//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use pipette_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::labware::{Deck, GridLayout, LabwareDirectory, WellGeometry};
// 不导出 types::Result，避免与 std Result 冲突
pub use crate::client::types::{BlowoutTarget, MixSpec, NewTipPolicy, PipetteError, TransferPlan};
pub use crate::client::{
    CancellationToken, Location, Pipette, PipetteBuilder, PipetteState, TipInventory, TipRack,
    WellRef,
};

// 驱动层
pub use crate::driver::{
    CommandCallback, MotionCommand, MotionController, RecordingHook, SimulatedController,
    ToolActivation,
};

// 协议层
pub use crate::protocol::{MoveTarget, PipetteConfig, Point3, Position, Speeds};

// 错误类型
pub use crate::driver::DriverError;
pub use crate::protocol::ConfigError;
