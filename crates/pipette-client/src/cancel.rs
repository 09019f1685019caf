//! 取消令牌
//!
//! 物理运动不能在行程中安全中断，因此取消只在坐标解析边界生效：
//! 已下发的运动会执行完毕，下一次解析目标位置时返回 `PipetteError::Cancelled`。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 取消令牌（可跨线程克隆共享）
///
/// ```rust
/// use pipette_client::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// std::thread::spawn(move || handle.cancel()).join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 清除取消请求
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
