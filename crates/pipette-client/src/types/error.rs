//! 错误类型体系
//!
//! 区分前置条件失败（任何运动之前即返回，无副作用）和运动中故障
//! （当前动作的剩余步骤被中止，状态标志停留在最后一次成功更新的值）。
//!
//! # 示例
//!
//! ```rust
//! use pipette_client::PipetteError;
//!
//! fn handle_error(err: PipetteError) {
//!     if err.is_precondition() {
//!         eprintln!("未执行任何运动: {}", err);
//!     } else if err.is_motion_fault() {
//!         eprintln!("运动中断，需要人工确认物理状态: {}", err);
//!     } else {
//!         eprintln!("错误: {}", err);
//!     }
//! }
//! ```

use crate::inventory::InventoryExhausted;
use crate::labware::LabwareError;
use pipette_driver::DriverError;
use pipette_protocol::ConfigError;
use thiserror::Error;

/// 移液器错误类型
#[derive(Debug, Error)]
pub enum PipetteError {
    // ==================== 前置条件 ====================
    /// 需要吸头的动作在未装吸头时调用
    #[error("No tip is attached, cannot complete this action")]
    NoTipAttached,

    /// 已装吸头时再次取吸头
    #[error("Pipette already equipped with a tip")]
    TipAlreadyAttached,

    /// 工具不是平台当前激活的工具
    #[error("Tool {tool} is not the active tool")]
    ToolNotActive {
        /// 工具编号
        tool: u8,
    },

    /// 没有记录当前所在的孔
    #[error("Cannot {operation}: pipette is not positioned over a well")]
    NotPositioned {
        /// 动作名称
        operation: &'static str,
    },

    /// stir 时吸头不在当前孔的 (x, y)
    #[error("Pipette should be in well {well} before it can stir (at x={x}, y={y})")]
    NotInWell {
        /// 孔
        well: String,
        /// 当前 x
        x: f64,
        /// 当前 y
        y: f64,
    },

    /// 吸头库存用尽
    #[error(transparent)]
    InventoryExhausted(#[from] InventoryExhausted),

    /// 没有关联吸头架
    #[error("No tip rack associated with this pipette")]
    NoTipRack,

    /// 操作已被取消
    #[error("Operation cancelled")]
    Cancelled,

    // ==================== 协作方错误 ====================
    /// 坐标解析失败
    #[error("Labware error: {0}")]
    Labware(#[from] LabwareError),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 运动控制器故障
    #[error("Motion controller error: {0}")]
    Motion(#[from] DriverError),
}

impl PipetteError {
    /// 是否为前置条件失败（保证未下发任何运动命令）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PipetteError::NoTipAttached
                | PipetteError::TipAlreadyAttached
                | PipetteError::ToolNotActive { .. }
                | PipetteError::NotPositioned { .. }
                | PipetteError::NotInWell { .. }
                | PipetteError::InventoryExhausted(_)
                | PipetteError::NoTipRack
        )
    }

    /// 是否为运动控制器故障
    pub fn is_motion_fault(&self) -> bool {
        matches!(self, PipetteError::Motion(DriverError::MotionFault(_)))
    }
}

/// 客户端层 Result
pub type Result<T> = std::result::Result<T, PipetteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PipetteError::NoTipAttached.to_string(),
            "No tip is attached, cannot complete this action"
        );
        assert_eq!(
            PipetteError::ToolNotActive { tool: 3 }.to_string(),
            "Tool 3 is not the active tool"
        );
        assert_eq!(
            PipetteError::NotPositioned {
                operation: "blowout"
            }
            .to_string(),
            "Cannot blowout: pipette is not positioned over a well"
        );
        assert_eq!(
            PipetteError::from(InventoryExhausted).to_string(),
            "Tip inventory exhausted"
        );
    }

    #[test]
    fn test_classification() {
        assert!(PipetteError::NoTipAttached.is_precondition());
        assert!(PipetteError::TipAlreadyAttached.is_precondition());
        assert!(!PipetteError::Cancelled.is_motion_fault());

        let fault = PipetteError::from(DriverError::MotionFault("stall".to_string()));
        assert!(fault.is_motion_fault());
        assert!(!fault.is_precondition());

        let empty = PipetteError::from(DriverError::EmptyMove);
        assert!(!empty.is_motion_fault());
    }
}
