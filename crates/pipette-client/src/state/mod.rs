//! 状态机模块

pub mod machine;

pub use machine::{Pipette, PipetteState};
