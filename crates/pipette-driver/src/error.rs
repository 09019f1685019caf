//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 运动控制器报告硬件故障
    ///
    /// 当前动作的剩余步骤会被中止，不做自动重试。
    #[error("Motion fault: {0}")]
    MotionFault(String),

    /// 空运动目标（没有任何轴）
    #[error("Empty move target")]
    EmptyMove,

    /// 原始命令被拒绝
    #[error("Raw command rejected: {command}: {reason}")]
    CommandRejected {
        /// 命令文本
        command: String,
        /// 原因
        reason: String,
    },
}
