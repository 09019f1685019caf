//! Pipette SDK - 电动移液器工具 Rust SDK
//!
//! 控制安装在多工具 G-code 运动平台上的电动移液器：吸液、排液、
//! 转移、混合、搅拌、吹出、空气隙，以及吸头的拾取、丢弃和归还。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 配置记录、体积换算、运动目标、G-code 文本
//! - **驱动层** (`driver`): 运动平台 trait、命令钩子、模拟平台
//! - **客户端层** (`client`): 状态机、液体处理与吸头更换流程
//!
//! # 快速开始
//!
//! ```rust
//! use pipette_sdk::prelude::*;
//!
//! let config = PipetteConfig {
//!     brand: "Opentrons".into(),
//!     model: "P300".into(),
//!     max_volume: 300.0,
//!     min_volume: 20.0,
//!     zero_position: 0.0,
//!     blowout_position: 5.0,
//!     drop_tip_position: 9.0,
//!     mm_to_ul: 0.1,
//! };
//!
//! let mut deck = Deck::new();
//! deck.add_well("plate", "A1", WellGeometry { x: 10.0, y: 20.0, z: 5.0, top: 15.0, diameter: 6.0 });
//!
//! let sim = SimulatedController::new().with_active_tool(1);
//! let mut pipette = PipetteBuilder::new(1, "p300", config)
//!     .tip_rack(TipRack::new(
//!         vec![Location::point(100.0, 80.0, 20.0), Location::point(109.0, 80.0, 20.0)],
//!         59.3,
//!         10.5,
//!     ))
//!     .build(sim, deck)
//!     .unwrap();
//!
//! pipette.pickup_tip(None).unwrap();
//! pipette.aspirate(50.0, &Location::well("plate", "A1"), None).unwrap();
//! pipette.blowout(None).unwrap();
//! pipette.drop_tip(None).unwrap();
//! ```

pub mod logging;
pub mod prelude;

pub use pipette_client as client;
pub use pipette_driver as driver;
pub use pipette_protocol as protocol;

// 客户端层（推荐入口）
pub use client::{
    BlowoutTarget, CancellationToken, Location, MixSpec, NewTipPolicy, Pipette, PipetteBuilder,
    PipetteError, PipetteState, TipRack, TransferPlan, WellRef,
};

// 驱动层
pub use driver::{DriverError, MotionController, SimulatedController, ToolActivation};

// 协议层
pub use protocol::{ConfigError, PipetteConfig, Speeds};

pub use logging::{init_logger, try_init_logger};
