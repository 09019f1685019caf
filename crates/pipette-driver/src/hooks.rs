//! 钩子系统（Hook System）
//!
//! 本模块提供运行时钩子管理功能，用于在运动命令被平台接受后触发自定义回调。
//!
//! # 使用示例
//!
//! ```rust
//! use pipette_driver::hooks::{CommandCallback, HookManager};
//! use pipette_driver::{MotionCommand, RecordingHook};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//!
//! let (hook, rx) = RecordingHook::new();
//! hooks.add_callback(Arc::new(hook) as Arc<dyn CommandCallback>);
//!
//! hooks.trigger_all(&MotionCommand::WaitForMotionComplete);
//! assert_eq!(rx.try_recv().unwrap(), MotionCommand::WaitForMotionComplete);
//! ```

use crate::command::MotionCommand;
use std::sync::Arc;

/// 命令回调 Trait
///
/// 实现必须是非阻塞的：推荐使用 `crossbeam_channel::Sender::try_send` 转交处理。
pub trait CommandCallback: Send + Sync {
    /// 命令被平台接受后调用
    ///
    /// 失败的命令不会触发回调。
    fn on_command(&self, command: &MotionCommand);
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn CommandCallback>>,
}

impl HookManager {
    /// 创建新的钩子管理器
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// 添加回调
    pub fn add_callback(&mut self, callback: Arc<dyn CommandCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有回调
    pub fn trigger_all(&self, command: &MotionCommand) {
        for callback in self.callbacks.iter() {
            callback.on_command(command);
        }
    }

    /// 获取回调数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// 检查是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
