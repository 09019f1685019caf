//! 移液器状态机
//!
//! 持有运行时状态（是否装吸头、是否已归零、当前所在孔、下一个吸头），
//! 并且是唯一可以修改这些标志的组件。每个物理动作在构造任何运动命令
//! 之前先经过显式的守卫检查：
//!
//! ```text
//! 吸头轴:  NoTip --pickup_tip--> TipAttached --drop_tip | return_tip--> NoTip
//! 归零轴:  Unprimed --prime--> Primed
//! ```
//!
//! 守卫顺序固定为：激活工具 → 吸头 → 当前孔。

use crate::cancel::CancellationToken;
use crate::inventory::{InventoryExhausted, TipInventory, TipRack};
use crate::labware::{LabwareDirectory, Location, ResolvedLocation, WellContext};
use crate::types::{PipetteError, Result};
use pipette_driver::{MotionController, ToolActivation};
use pipette_protocol::{MoveTarget, PipetteConfig, Point3, Speeds, VolumeConverter};
use tracing::{debug, info, warn};

// ==================== 运行时状态 ====================

/// 移液器运行时状态
///
/// 只读视图对外公开；状态转换只能由 `Pipette` 的动作触发。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipetteState {
    has_tip: bool,
    is_primed: bool,
    current_location: Option<WellContext>,
    next_tip: Option<Location>,
}

impl PipetteState {
    /// 是否已装吸头
    pub fn has_tip(&self) -> bool {
        self.has_tip
    }

    /// 柱塞是否已归零
    ///
    /// 一旦归零即保持为 true，直到工具实例销毁。
    pub fn is_primed(&self) -> bool {
        self.is_primed
    }

    /// 最近一次吸液/排液所在的孔
    pub fn current_location(&self) -> Option<&WellContext> {
        self.current_location.as_ref()
    }

    /// 下一个可用吸头（库存用尽时为 None）
    pub fn next_tip(&self) -> Option<&Location> {
        self.next_tip.as_ref()
    }

    pub(crate) fn attach_tip(&mut self) {
        debug!("Tip state: NoTip -> TipAttached");
        self.has_tip = true;
    }

    pub(crate) fn release_tip(&mut self) {
        debug!("Tip state: TipAttached -> NoTip");
        self.has_tip = false;
    }

    pub(crate) fn mark_primed(&mut self) {
        if !self.is_primed {
            debug!("Prime state: Unprimed -> Primed");
        }
        self.is_primed = true;
    }

    pub(crate) fn enter_well(&mut self, context: WellContext) {
        debug!("Position context: {}", context.well);
        self.current_location = Some(context);
    }

    pub(crate) fn set_next_tip(&mut self, tip: Option<Location>) {
        self.next_tip = tip;
    }
}

/// 已关联的吸头库存及其 z 偏移补偿量
#[derive(Debug, Clone)]
pub(crate) struct TipSupply {
    pub(crate) inventory: TipInventory<Location>,
    pub(crate) tip_offset: f64,
}

impl TipSupply {
    /// 前移库存并返回新的库存头
    pub(crate) fn next(&mut self) -> std::result::Result<Location, InventoryExhausted> {
        match self.inventory.advance() {
            Ok(tip) => Ok(tip.clone()),
            Err(err) => {
                warn!("Tip inventory exhausted, no next tip available");
                Err(err)
            },
        }
    }
}

// ==================== Pipette ====================

/// 移液器工具
///
/// # 类型参数
///
/// - `M`: 运动平台（同时提供工具激活状态）
/// - `L`: 耗材目录
///
/// # 并发
///
/// 单线程、单所有者。所有动作都是阻塞的运动序列，调用方必须串行调用。
///
/// # 示例
///
/// ```rust
/// use pipette_client::{Location, Pipette};
/// use pipette_client::labware::Deck;
/// use pipette_driver::SimulatedController;
/// use pipette_protocol::PipetteConfig;
///
/// let config = PipetteConfig {
///     brand: "Opentrons".into(),
///     model: "P300".into(),
///     max_volume: 300.0,
///     min_volume: 20.0,
///     zero_position: 0.0,
///     blowout_position: 5.0,
///     drop_tip_position: 9.0,
///     mm_to_ul: 0.1,
/// };
/// let sim = SimulatedController::new().with_active_tool(1);
/// let mut pipette = Pipette::new(1, "p300", config, sim, Deck::new()).unwrap();
///
/// pipette.prime(None).unwrap();
/// assert!(pipette.state().is_primed());
///
/// // 未装吸头时吸液失败，且不产生任何运动
/// assert!(pipette.aspirate(50.0, &Location::point(0.0, 0.0, 0.0), None).is_err());
/// ```
pub struct Pipette<M, L> {
    pub(crate) index: u8,
    pub(crate) name: String,
    pub(crate) config: PipetteConfig,
    pub(crate) converter: VolumeConverter,
    pub(crate) speeds: Speeds,
    pub(crate) controller: M,
    pub(crate) labware: L,
    pub(crate) state: PipetteState,
    pub(crate) tips: Option<TipSupply>,
    pub(crate) cancel: CancellationToken,
}

impl<M, L> Pipette<M, L> {
    /// 使用默认速度创建
    ///
    /// # 错误
    ///
    /// - `PipetteError::Config`: 配置未通过校验
    pub fn new(
        index: u8,
        name: impl Into<String>,
        config: PipetteConfig,
        controller: M,
        labware: L,
    ) -> Result<Self> {
        Self::with_options(
            index,
            name.into(),
            config,
            Speeds::default(),
            CancellationToken::new(),
            controller,
            labware,
        )
    }

    pub(crate) fn with_options(
        index: u8,
        name: String,
        config: PipetteConfig,
        speeds: Speeds,
        cancel: CancellationToken,
        controller: M,
        labware: L,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "Pipette '{}' (tool {}) created: {} {}, {}-{} uL",
            name, index, config.brand, config.model, config.min_volume, config.max_volume
        );
        Ok(Self {
            index,
            name,
            converter: config.converter(),
            config,
            speeds,
            controller,
            labware,
            state: PipetteState::default(),
            tips: None,
            cancel,
        })
    }

    /// 工具编号
    pub fn index(&self) -> u8 {
        self.index
    }

    /// 工具名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PipetteConfig {
        &self.config
    }

    pub fn speeds(&self) -> &Speeds {
        &self.speeds
    }

    /// 运行时状态（只读）
    pub fn state(&self) -> &PipetteState {
        &self.state
    }

    pub fn controller(&self) -> &M {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut M {
        &mut self.controller
    }

    pub fn labware(&self) -> &L {
        &self.labware
    }

    /// 取消令牌（克隆后可在其他线程调用 `cancel()`）
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 吸头库存（未关联吸头架时为 None）
    pub fn tip_inventory(&self) -> Option<&TipInventory<Location>> {
        self.tips.as_ref().map(|supply| &supply.inventory)
    }

    /// 体积 → 柱塞位移
    pub fn volume_to_displacement(&self, volume: f64) -> f64 {
        self.converter.volume_to_displacement(volume)
    }

    /// 关联一个吸头架
    pub fn add_tip_rack(&mut self, rack: TipRack) {
        self.add_tip_racks(vec![rack]);
    }

    /// 关联多个吸头架
    ///
    /// 各架吸头按顺序拼接为一个库存；z 偏移补偿量取第一个架的参数。
    /// 库存头（下一个吸头）设为第一个吸头。
    pub fn add_tip_racks(&mut self, racks: Vec<TipRack>) {
        let tip_offset = racks.first().map(TipRack::tip_offset).unwrap_or(0.0);
        let slots: Vec<Location> = racks.into_iter().flat_map(|rack| rack.slots).collect();
        info!(
            "Tool {}: {} tips associated (tip offset {:.3} mm)",
            self.index,
            slots.len(),
            tip_offset
        );

        let mut supply = TipSupply {
            inventory: TipInventory::new(slots),
            tip_offset,
        };
        let head = supply.next().ok();
        self.state.set_next_tip(head);
        self.tips = Some(supply);
    }

    /// 手动跳过当前库存头
    ///
    /// # 错误
    ///
    /// - `PipetteError::NoTipRack`: 未关联吸头架
    /// - `PipetteError::InventoryExhausted`: 没有更多吸头
    pub fn increment_tip(&mut self) -> Result<&Location> {
        let supply = self.tips.as_mut().ok_or(PipetteError::NoTipRack)?;
        let tip = supply.inventory.advance()?.clone();
        self.state.set_next_tip(Some(tip));
        self.state.next_tip().ok_or(PipetteError::NoTipRack)
    }
}

impl<M, L> Pipette<M, L>
where
    M: MotionController + ToolActivation,
    L: LabwareDirectory,
{
    /// 柱塞归零
    ///
    /// 任何状态下都合法（仍要求工具已激活）。
    pub fn prime(&mut self, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        let speed = speed.unwrap_or(self.speeds.prime);
        info!("Tool {}: prime (F{})", self.index, speed);
        self.prime_plunger(speed)
    }

    // ==================== 守卫 ====================

    pub(crate) fn require_active(&self) -> Result<()> {
        if self.controller.is_active(self.index) {
            Ok(())
        } else {
            Err(PipetteError::ToolNotActive { tool: self.index })
        }
    }

    pub(crate) fn require_tip(&self) -> Result<()> {
        if self.state.has_tip() {
            Ok(())
        } else {
            Err(PipetteError::NoTipAttached)
        }
    }

    pub(crate) fn require_position(&self, operation: &'static str) -> Result<WellContext> {
        self.state
            .current_location()
            .cloned()
            .ok_or(PipetteError::NotPositioned { operation })
    }

    /// 坐标解析（取消令牌在此生效）
    pub(crate) fn resolve(&self, location: &Location) -> Result<ResolvedLocation> {
        if self.cancel.is_cancelled() {
            info!("Tool {}: cancelled before resolving {}", self.index, location);
            return Err(PipetteError::Cancelled);
        }
        Ok(self.labware.resolve(location)?)
    }

    // ==================== 运动原语 ====================

    /// 回撤 → 水平移动 → 下降
    pub(crate) fn travel_to(&mut self, point: Point3) -> Result<()> {
        self.controller.retract_to_safe_height()?;
        self.controller.move_to(&MoveTarget::xy(point.x, point.y))?;
        self.controller.move_to(&MoveTarget::z(point.z))?;
        Ok(())
    }

    pub(crate) fn prime_plunger(&mut self, speed: f64) -> Result<()> {
        self.controller
            .move_to(&MoveTarget::plunger(self.config.zero_position).with_speed(speed))?;
        self.state.mark_primed();
        Ok(())
    }

    /// 未归零时先归零
    pub(crate) fn ensure_primed(&mut self) -> Result<()> {
        if self.state.is_primed() {
            return Ok(());
        }
        debug!("Tool {}: plunger not primed, priming first", self.index);
        self.prime_plunger(self.speeds.prime)
    }

    /// 从当前柱塞位置回抽（吸液方向）
    pub(crate) fn draw(&mut self, volume: f64, speed: f64) -> Result<()> {
        let displacement = -self.converter.volume_to_displacement(volume);
        self.plunger_by(displacement, speed)
    }

    /// 从当前柱塞位置下压（排液方向）
    pub(crate) fn expel(&mut self, volume: f64, speed: f64) -> Result<()> {
        let displacement = self.converter.volume_to_displacement(volume);
        self.plunger_by(displacement, speed)
    }

    fn plunger_by(&mut self, displacement: f64, speed: f64) -> Result<()> {
        self.controller
            .move_relative(&MoveTarget::plunger(displacement).with_speed(speed))?;
        Ok(())
    }
}

impl<M, L> std::fmt::Debug for Pipette<M, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipette")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
