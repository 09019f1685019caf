//! 模拟运动平台
//!
//! 在内存中维护 X/Y/Z/V 位置并记录每一条被接受的运动命令。
//! 用于单元测试、集成测试以及 CLI 的 dry-run 模式。
//!
//! 查询类调用（`position`、`is_active`、`tool_z_offset`、`safe_height`）
//! 不进入命令日志。

use crate::command::MotionCommand;
use crate::controller::{MotionController, ToolActivation};
use crate::error::DriverError;
use crate::hooks::HookManager;
use pipette_protocol::{MoveTarget, Position, RawCommand};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// 默认安全高度（mm）
const DEFAULT_SAFE_HEIGHT: f64 = 150.0;

/// 模拟运动平台
///
/// # 示例
///
/// ```rust
/// use pipette_driver::{MotionController, MotionCommand, SimulatedController};
/// use pipette_protocol::MoveTarget;
///
/// let mut sim = SimulatedController::new().with_active_tool(1);
/// sim.move_to(&MoveTarget::xy(10.0, 20.0)).unwrap();
///
/// assert_eq!(sim.journal().len(), 1);
/// assert_eq!(sim.position().unwrap().x, 10.0);
/// ```
#[derive(Debug)]
pub struct SimulatedController {
    position: Position,
    safe_height: f64,
    active_tool: Option<u8>,
    baseline_offsets: BTreeMap<u8, f64>,
    live_offsets: BTreeMap<u8, f64>,
    journal: Vec<MotionCommand>,
    /// 还剩多少条命令成功后注入故障
    fault_countdown: Option<usize>,
    hooks: HookManager,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedController {
    /// 创建模拟平台：原点位置，无激活工具
    pub fn new() -> Self {
        Self {
            position: Position::default(),
            safe_height: DEFAULT_SAFE_HEIGHT,
            active_tool: None,
            baseline_offsets: BTreeMap::new(),
            live_offsets: BTreeMap::new(),
            journal: Vec::new(),
            fault_countdown: None,
            hooks: HookManager::new(),
        }
    }

    /// 设置安全高度
    pub fn with_safe_height(mut self, safe_height: f64) -> Self {
        self.safe_height = safe_height;
        self
    }

    /// 设置激活工具
    pub fn with_active_tool(mut self, tool: u8) -> Self {
        self.active_tool = Some(tool);
        self
    }

    /// 设置工具基准 z 偏移
    pub fn with_tool_offset(mut self, tool: u8, z: f64) -> Self {
        self.baseline_offsets.insert(tool, z);
        self.live_offsets.insert(tool, z);
        self
    }

    /// 切换激活工具（`None` 表示未拾取任何工具）
    pub fn set_active_tool(&mut self, tool: Option<u8>) {
        self.active_tool = tool;
    }

    /// 直接设置位置（不记录日志）
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// 在 `successes` 条命令成功后，下一条命令返回 `MotionFault`
    pub fn inject_fault_after(&mut self, successes: usize) {
        self.fault_countdown = Some(successes);
    }

    /// 已接受的命令日志
    pub fn journal(&self) -> &[MotionCommand] {
        &self.journal
    }

    /// 取出并清空命令日志
    pub fn take_journal(&mut self) -> Vec<MotionCommand> {
        std::mem::take(&mut self.journal)
    }

    /// 当前生效的工具 z 偏移（反映 G10 命令）
    pub fn live_tool_offset(&self, tool: u8) -> f64 {
        self.live_offsets
            .get(&tool)
            .copied()
            .unwrap_or_else(|| self.baseline(tool))
    }

    /// 钩子管理器
    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    fn baseline(&self, tool: u8) -> f64 {
        self.baseline_offsets.get(&tool).copied().unwrap_or(0.0)
    }

    fn check_fault(&mut self, command: &MotionCommand) -> Result<(), DriverError> {
        match self.fault_countdown {
            Some(0) => {
                self.fault_countdown = None;
                warn!("Simulated motion fault on: {}", command);
                Err(DriverError::MotionFault(format!(
                    "simulated fault on '{command}'"
                )))
            },
            Some(n) => {
                self.fault_countdown = Some(n - 1);
                Ok(())
            },
            None => Ok(()),
        }
    }

    fn record(&mut self, command: MotionCommand) {
        trace!("sim <- {}", command);
        self.hooks.trigger_all(&command);
        self.journal.push(command);
    }

    fn apply_absolute(&mut self, target: &MoveTarget) {
        for (axis, value) in target.axes() {
            self.position.set(axis, value);
        }
    }

    fn apply_relative(&mut self, delta: &MoveTarget) {
        for (axis, value) in delta.axes() {
            let current = self.position.get(axis);
            self.position.set(axis, current + value);
        }
    }
}

impl MotionController for SimulatedController {
    fn move_to(&mut self, target: &MoveTarget) -> Result<(), DriverError> {
        if target.is_empty() {
            return Err(DriverError::EmptyMove);
        }
        let command = MotionCommand::MoveTo(*target);
        self.check_fault(&command)?;
        self.apply_absolute(target);
        self.record(command);
        Ok(())
    }

    fn move_relative(&mut self, delta: &MoveTarget) -> Result<(), DriverError> {
        if delta.is_empty() {
            return Err(DriverError::EmptyMove);
        }
        let command = MotionCommand::MoveRelative(*delta);
        self.check_fault(&command)?;
        self.apply_relative(delta);
        self.record(command);
        Ok(())
    }

    fn position(&mut self) -> Result<Position, DriverError> {
        Ok(self.position)
    }

    fn retract_to_safe_height(&mut self) -> Result<(), DriverError> {
        let z = self.position.z.max(self.safe_height);
        let command = MotionCommand::RetractToSafeHeight { z };
        self.check_fault(&command)?;
        self.position.z = z;
        self.record(command);
        Ok(())
    }

    fn safe_height(&self) -> f64 {
        self.safe_height
    }

    fn tool_z_offset(&self, tool: u8) -> Result<f64, DriverError> {
        Ok(self.baseline(tool))
    }

    fn send_raw(&mut self, command: &RawCommand) -> Result<(), DriverError> {
        if let RawCommand::Text(text) = command
            && text.trim().is_empty()
        {
            return Err(DriverError::CommandRejected {
                command: text.clone(),
                reason: "empty command".to_string(),
            });
        }
        let journaled = MotionCommand::Raw(command.clone());
        self.check_fault(&journaled)?;
        match command {
            RawCommand::Arc { x, y, z, .. } => {
                self.position.x = *x;
                self.position.y = *y;
                if let Some(z) = z {
                    self.position.z = *z;
                }
            },
            RawCommand::SetToolOffset { tool, z } => {
                self.live_offsets.insert(*tool, *z);
            },
            RawCommand::Text(_) => {},
        }
        self.record(journaled);
        Ok(())
    }

    fn wait_for_motion_complete(&mut self) -> Result<(), DriverError> {
        let command = MotionCommand::WaitForMotionComplete;
        self.check_fault(&command)?;
        self.record(command);
        Ok(())
    }
}

impl ToolActivation for SimulatedController {
    fn is_active(&self, tool: u8) -> bool {
        self.active_tool == Some(tool)
    }
}
