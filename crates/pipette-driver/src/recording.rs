//! 录制钩子
//!
//! 基于有界 Channel 的命令录制：回调中只做 `try_send`，队列满时丢弃并计数。
//!
//! # 使用示例
//!
//! ```rust
//! use pipette_driver::{RecordingHook, SimulatedController};
//! use std::sync::Arc;
//!
//! let (hook, rx) = RecordingHook::new();
//! let dropped = hook.dropped_commands().clone();
//!
//! let mut sim = SimulatedController::new();
//! sim.hooks_mut().add_callback(Arc::new(hook));
//!
//! std::thread::spawn(move || {
//!     while let Ok(command) = rx.recv() {
//!         println!("{command}");
//!     }
//! });
//! # let _ = dropped;
//! ```

use crate::command::MotionCommand;
use crate::hooks::CommandCallback;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 默认队列容量
const DEFAULT_CAPACITY: usize = 10_000;

/// 录制钩子
pub struct RecordingHook {
    sender: Sender<MotionCommand>,
    dropped: Arc<AtomicU64>,
}

impl RecordingHook {
    /// 使用默认容量创建
    #[must_use]
    pub fn new() -> (Self, Receiver<MotionCommand>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 指定队列容量
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<MotionCommand>) {
        let (sender, receiver) = bounded(capacity);
        let hook = Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (hook, receiver)
    }

    /// 丢弃计数
    pub fn dropped_commands(&self) -> &Arc<AtomicU64> {
        &self.dropped
    }
}

impl CommandCallback for RecordingHook {
    fn on_command(&self, command: &MotionCommand) {
        if self.sender.try_send(command.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_hook_forwards() {
        let (hook, rx) = RecordingHook::new();
        hook.on_command(&MotionCommand::WaitForMotionComplete);
        assert_eq!(rx.try_recv().unwrap(), MotionCommand::WaitForMotionComplete);
        assert_eq!(hook.dropped_commands().load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_recording_hook_counts_drops_when_full() {
        let (hook, _rx) = RecordingHook::with_capacity(1);
        hook.on_command(&MotionCommand::WaitForMotionComplete);
        hook.on_command(&MotionCommand::WaitForMotionComplete);
        hook.on_command(&MotionCommand::WaitForMotionComplete);
        assert_eq!(hook.dropped_commands().load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_recording_hook_counts_drops_when_disconnected() {
        let (hook, rx) = RecordingHook::new();
        drop(rx);
        hook.on_command(&MotionCommand::WaitForMotionComplete);
        assert_eq!(hook.dropped_commands().load(Ordering::Relaxed), 1);
    }
}
