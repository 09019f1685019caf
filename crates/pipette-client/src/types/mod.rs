//! 类型系统
//!
//! - `error`: 错误类型
//! - `transfer`: 转移计划

pub mod error;
pub mod transfer;

pub use error::{PipetteError, Result};
pub use transfer::{BlowoutTarget, MixSpec, NewTipPolicy, TransferPlan};
