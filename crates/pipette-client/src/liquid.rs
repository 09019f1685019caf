//! 液体处理
//!
//! 吸液、排液、转移、吹出、空气隙、混合、搅拌。每个动作都表达为对
//! 运动平台的有序调用，由状态机守卫把关。

use crate::labware::{LabwareDirectory, Location, ResolvedLocation, WellContext};
use crate::state::Pipette;
use crate::types::{BlowoutTarget, MixSpec, PipetteError, Result, TransferPlan};
use pipette_driver::{MotionController, ToolActivation};
use pipette_protocol::motion::round_to;
use pipette_protocol::{
    AIR_GAP_HEIGHT, ArcDirection, BLOWOUT_HEIGHT, DISPENSE_CLEARANCE, MIX_APPROACH_HEIGHT,
    MoveTarget, POSITION_DECIMALS, RawCommand, STIR_BOTTOM_CLEARANCE,
};
use tracing::{debug, info};

impl<M, L> Pipette<M, L>
where
    M: MotionController + ToolActivation,
    L: LabwareDirectory,
{
    /// 吸液
    ///
    /// 回撤 → 水平移动 → 下降 → （未归零时先归零）→ 柱塞回抽。
    ///
    /// # 错误
    ///
    /// - `ToolNotActive` / `NoTipAttached`: 不产生任何运动
    /// - `Labware`: 位置无法解析
    /// - `Motion`: 运动平台故障
    pub fn aspirate(&mut self, volume: f64, location: &Location, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let resolved = self.resolve(location)?;
        let speed = speed.unwrap_or(self.speeds.plunger);

        info!("Tool {}: aspirate {} uL at {}", self.index, volume, location);
        self.travel_to(resolved.point)?;
        self.enter(resolved.well);
        self.ensure_primed()?;
        self.draw(volume, speed)
    }

    /// 排液
    ///
    /// 直接给出孔（而非孔内坐标）时，在孔底上方 10 mm 处排液，
    /// 避免吸头接触刚排出的液滴。
    pub fn dispense(&mut self, volume: f64, location: &Location, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let resolved = self.resolve(location)?;
        let speed = speed.unwrap_or(self.speeds.plunger);

        info!("Tool {}: dispense {} uL at {}", self.index, volume, location);
        self.dispense_at(volume, resolved, speed)
    }

    /// 转移
    ///
    /// 每个目标依次执行：到源孔吸液 → 混合（可选）→ 到目标排液 →
    /// 混合（可选）→ 吹出（可选）。源孔对每个目标都会重新访问。
    ///
    /// 换吸头策略当前只被记录，不会在目标之间更换吸头。
    ///
    /// # 错误
    ///
    /// 在任何运动之前检查：
    /// - 计划要求在源孔混合但源不是孔：`NotPositioned`
    /// - 计划要求在目标混合或原地吹出但目标不是孔：`NotPositioned`
    pub fn transfer(&mut self, plan: &TransferPlan, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        check_plan(plan)?;
        let speed = speed.unwrap_or(self.speeds.transfer);
        let source = self.resolve(plan.source())?;

        info!(
            "Tool {}: transfer {} uL from {} to {} destination(s)",
            self.index,
            plan.volume(),
            plan.source(),
            plan.destinations().len()
        );
        debug!("New tip policy {:?} accepted, not enforced", plan.new_tip_policy());

        self.ensure_primed()?;
        for destination in plan.destinations() {
            let target = self.resolve(destination)?;

            self.travel_to(source.point)?;
            self.enter(source.well.clone());
            self.draw(plan.volume(), speed)?;
            if let Some(mix) = plan.mix_before_spec() {
                self.mix_here(mix, self.speeds.mix)?;
            }

            self.travel_to(target.point)?;
            self.enter(target.well);
            self.expel(plan.volume(), speed)?;
            if let Some(mix) = plan.mix_after_spec() {
                self.mix_here(mix, self.speeds.mix)?;
            }

            match plan.blowout_target() {
                Some(BlowoutTarget::InPlace) => self.blowout_here(self.speeds.blowout)?,
                Some(BlowoutTarget::At(location)) => {
                    let resolved = self.resolve(location)?;
                    self.controller.retract_to_safe_height()?;
                    self.controller
                        .move_to(&MoveTarget::xy(resolved.point.x, resolved.point.y))?;
                    self.enter(resolved.well);
                    self.blowout_here(self.speeds.blowout)?;
                },
                None => {},
            }
        }
        Ok(())
    }

    /// 吹出
    ///
    /// 在当前孔顶上方 5 mm 处把柱塞推到吹出位置，然后重新归零。
    pub fn blowout(&mut self, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        self.require_position("blowout")?;
        let speed = speed.unwrap_or(self.speeds.blowout);

        info!("Tool {}: blowout", self.index);
        self.blowout_here(speed)
    }

    /// 空气隙
    ///
    /// 升到当前孔顶上方 20 mm，柱塞按体积回抽。不做水平移动，不重新归零。
    pub fn air_gap(&mut self, volume: f64) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let context = self.require_position("air_gap")?;

        info!("Tool {}: air gap {} uL above {}", self.index, volume, context.well);
        self.controller
            .move_to(&MoveTarget::z(context.geometry.top + AIR_GAP_HEIGHT))?;
        let displacement = -self.converter.volume_to_displacement(volume);
        self.controller
            .move_relative(&MoveTarget::plunger(displacement))?;
        Ok(())
    }

    /// 混合：在当前孔底反复吸液、归零
    pub fn mix(&mut self, volume: f64, cycles: u32, speed: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        self.require_position("mix")?;
        let speed = speed.unwrap_or(self.speeds.mix);

        info!("Tool {}: mix {} uL x{}", self.index, volume, cycles);
        self.mix_here(MixSpec::new(cycles, volume), speed)
    }

    /// 搅拌
    ///
    /// 吸头必须位于当前孔中心（保留两位小数比较），否则返回 `NotInWell`。
    /// 先降到孔底上方 0.5 mm，每圈发出一条顺时针圆弧命令并等待运动完成。
    /// 给出 `height` 时圆弧终点抬高该距离，完成后回到搅拌高度。
    pub fn stir(&mut self, cycles: u32, height: Option<f64>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let WellContext { well, geometry } = self.require_position("stir")?;

        let position = self.controller.position()?;
        let at_center = round_to(position.x, POSITION_DECIMALS)
            == round_to(geometry.x, POSITION_DECIMALS)
            && round_to(position.y, POSITION_DECIMALS) == round_to(geometry.y, POSITION_DECIMALS);
        if !at_center {
            return Err(PipetteError::NotInWell {
                well: well.to_string(),
                x: position.x,
                y: position.y,
            });
        }

        info!("Tool {}: stir x{} in {}", self.index, cycles, well);
        let stir_z = geometry.z + STIR_BOTTOM_CLEARANCE;
        if round_to(position.z, POSITION_DECIMALS) != round_to(stir_z, POSITION_DECIMALS) {
            self.controller.move_to(&MoveTarget::z(stir_z))?;
        }

        let arc = RawCommand::Arc {
            direction: ArcDirection::Clockwise,
            x: geometry.x,
            y: geometry.y,
            z: height.map(|h| stir_z + h),
            i: -geometry.stir_radius(),
            j: 0.0,
        };
        for _ in 0..cycles {
            self.controller.send_raw(&arc)?;
            self.controller.wait_for_motion_complete()?;
            if height.is_some() {
                self.controller.move_to(&MoveTarget::z(stir_z))?;
            }
        }
        Ok(())
    }

    // ==================== 内部序列 ====================

    fn enter(&mut self, well: Option<WellContext>) {
        if let Some(context) = well {
            self.state.enter_well(context);
        }
    }

    fn dispense_at(&mut self, volume: f64, resolved: ResolvedLocation, speed: f64) -> Result<()> {
        let mut point = resolved.point;
        if resolved.bare_well {
            point = point.raised(DISPENSE_CLEARANCE);
        }
        self.travel_to(point)?;
        self.enter(resolved.well);
        self.expel(volume, speed)
    }

    fn blowout_here(&mut self, speed: f64) -> Result<()> {
        let context = self.require_position("blowout")?;
        self.controller
            .move_to(&MoveTarget::z(context.geometry.top + BLOWOUT_HEIGHT))?;
        self.controller.move_to(
            &MoveTarget::plunger(self.config.blowout_position).with_speed(speed),
        )?;
        self.prime_plunger(self.speeds.prime)
    }

    fn mix_here(&mut self, mix: MixSpec, speed: f64) -> Result<()> {
        let context = self.require_position("mix")?;
        self.controller
            .move_to(&MoveTarget::z(context.geometry.top + MIX_APPROACH_HEIGHT))?;
        self.prime_plunger(self.speeds.prime)?;
        self.controller.move_to(&MoveTarget::z(context.geometry.z))?;
        for _ in 0..mix.cycles {
            self.draw(mix.volume, speed)?;
            self.prime_plunger(speed)?;
        }
        Ok(())
    }
}

/// 计划的位置前置条件（不做任何解析）
fn check_plan(plan: &TransferPlan) -> Result<()> {
    if plan.mix_before_spec().is_some() && plan.source().well_ref().is_none() {
        return Err(PipetteError::NotPositioned {
            operation: "transfer mix_before",
        });
    }
    let all_wells = plan
        .destinations()
        .iter()
        .all(|destination| destination.well_ref().is_some());
    if plan.mix_after_spec().is_some() && !all_wells {
        return Err(PipetteError::NotPositioned {
            operation: "transfer mix_after",
        });
    }
    if matches!(plan.blowout_target(), Some(BlowoutTarget::InPlace)) && !all_wells {
        return Err(PipetteError::NotPositioned {
            operation: "transfer blowout",
        });
    }
    if let Some(BlowoutTarget::At(location)) = plan.blowout_target()
        && location.well_ref().is_none()
    {
        return Err(PipetteError::NotPositioned {
            operation: "transfer blowout",
        });
    }
    Ok(())
}
