//! 吸头更换
//!
//! 拾取、丢弃、归还吸头，以及装卸吸头后的工具 z 偏移补偿。
//!
//! `drop_tip` 每次消耗一个库存位置；`return_tip` 不移动库存游标，
//! 归还的吸头之后可以再次被拾取。

use crate::labware::{LabwareDirectory, Location};
use crate::state::Pipette;
use crate::types::{PipetteError, Result};
use pipette_driver::{MotionController, ToolActivation};
use pipette_protocol::{MoveTarget, PICKUP_LIFT, RETURN_TIP_DEPTH, RawCommand};
use tracing::{debug, info};

impl<M, L> Pipette<M, L>
where
    M: MotionController + ToolActivation,
    L: LabwareDirectory,
{
    /// 拾取吸头
    ///
    /// 未指定位置时取库存头。到达吸头上方后以探测运动下降，
    /// 传感器触发即停止；随后应用 z 偏移补偿并抬升到安全高度以上。
    /// 未关联吸头架时只能拾取指定位置，不做吸头长度补偿。
    ///
    /// # 错误
    ///
    /// - `TipAlreadyAttached`: 已装吸头（不产生任何运动）
    /// - `NoTipRack`: 未指定位置且未关联吸头架
    /// - `InventoryExhausted`: 未指定位置且库存已用尽
    pub fn pickup_tip(&mut self, target: Option<&Location>) -> Result<()> {
        self.require_active()?;
        if self.state.has_tip() {
            return Err(PipetteError::TipAlreadyAttached);
        }
        let location = match target {
            Some(location) => location.clone(),
            None => self.head_tip()?,
        };
        let resolved = self.resolve(&location)?;

        info!("Tool {}: pick up tip at {}", self.index, location);
        self.controller.retract_to_safe_height()?;
        self.controller
            .move_to(&MoveTarget::xy(resolved.point.x, resolved.point.y))?;
        self.controller.move_to(
            &MoveTarget::z(resolved.point.z)
                .with_speed(self.speeds.probe)
                .probing(),
        )?;

        self.state.attach_tip();
        self.update_z_offset(true)?;
        let lift = self.controller.safe_height() + PICKUP_LIFT;
        self.controller.move_to(&MoveTarget::z(lift))?;
        Ok(())
    }

    /// 丢弃吸头
    ///
    /// 给出位置时先移动到其上方（只做水平移动），然后把柱塞推到弹出位置、
    /// 重新归零，并把库存前移一位。
    ///
    /// # 错误
    ///
    /// - `InventoryExhausted`: 库存已用尽。吸头仍会被弹出，库存头置为 None
    pub fn drop_tip(&mut self, location: Option<&Location>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let resolved = location.map(|l| self.resolve(l)).transpose()?;

        info!("Tool {}: drop tip", self.index);
        if let Some(resolved) = resolved {
            self.controller.retract_to_safe_height()?;
            self.controller
                .move_to(&MoveTarget::xy(resolved.point.x, resolved.point.y))?;
        }
        self.eject()?;
        self.prime_plunger(self.speeds.prime)?;
        self.state.release_tip();
        self.update_z_offset(false)?;

        let Some(supply) = self.tips.as_mut() else {
            return Ok(());
        };
        match supply.next() {
            Ok(tip) => {
                self.state.set_next_tip(Some(tip));
                Ok(())
            },
            Err(err) => {
                self.state.set_next_tip(None);
                Err(err.into())
            },
        }
    }

    /// 归还吸头到原位置
    ///
    /// 未指定位置时使用库存头（即刚拾取的吸头）。下降 25 mm 弹出，
    /// 再升回 25 mm。库存游标不变。
    pub fn return_tip(&mut self, location: Option<&Location>) -> Result<()> {
        self.require_active()?;
        self.require_tip()?;
        let location = match location {
            Some(location) => location.clone(),
            None => self.head_tip()?,
        };
        let resolved = self.resolve(&location)?;

        info!("Tool {}: return tip to {}", self.index, location);
        self.controller.retract_to_safe_height()?;
        self.controller
            .move_to(&MoveTarget::xy(resolved.point.x, resolved.point.y))?;
        self.controller
            .move_relative(&MoveTarget::z(-RETURN_TIP_DEPTH))?;
        self.eject()?;
        self.controller
            .move_relative(&MoveTarget::z(RETURN_TIP_DEPTH))?;
        self.prime_plunger(self.speeds.prime)?;
        self.state.release_tip();
        self.update_z_offset(false)
    }

    /// 应用或撤销吸头长度补偿
    ///
    /// 基准偏移取自运动平台；装吸头时下移 `tip_length - tip_overlap`
    /// （取第一个吸头架的参数），卸下时恢复基准。
    pub fn update_z_offset(&mut self, attached: bool) -> Result<()> {
        let baseline = self.controller.tool_z_offset(self.index)?;
        let tip_offset = self.tips.as_ref().map_or(0.0, |supply| supply.tip_offset);
        let z = if attached {
            baseline - tip_offset
        } else {
            baseline
        };
        debug!("Tool {}: z offset {} (tip attached: {})", self.index, z, attached);
        self.controller
            .send_raw(&RawCommand::SetToolOffset { tool: self.index, z })?;
        Ok(())
    }

    fn eject(&mut self) -> Result<()> {
        self.controller.move_to(
            &MoveTarget::plunger(self.config.drop_tip_position).with_speed(self.speeds.eject),
        )?;
        Ok(())
    }

    fn head_tip(&self) -> Result<Location> {
        match (&self.tips, self.state.next_tip()) {
            (None, _) => Err(PipetteError::NoTipRack),
            (Some(_), None) => Err(crate::inventory::InventoryExhausted.into()),
            (Some(_), Some(tip)) => Ok(tip.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::TipRack;
    use crate::labware::{Deck, GridLayout};
    use pipette_driver::{MotionCommand, SimulatedController};
    use pipette_protocol::{Axis, PipetteConfig};

    fn config() -> PipetteConfig {
        PipetteConfig {
            brand: "Opentrons".to_string(),
            model: "OT2 P300 Single".to_string(),
            max_volume: 300.0,
            min_volume: 20.0,
            zero_position: 0.0,
            blowout_position: 5.5,
            drop_tip_position: 9.5,
            mm_to_ul: 0.1,
        }
    }

    fn pipette(tips: usize) -> Pipette<SimulatedController, Deck> {
        let mut deck = Deck::new();
        deck.add_grid(
            "tips",
            &GridLayout {
                rows: 8,
                columns: 12,
                a1_x: 100.0,
                a1_y: 80.0,
                pitch: 9.0,
                bottom_z: 20.0,
                depth: 50.0,
                diameter: 5.0,
            },
        )
        .unwrap();
        let slots = deck
            .wells("tips")
            .into_iter()
            .take(tips)
            .map(Location::Well)
            .collect();
        let sim = SimulatedController::new()
            .with_active_tool(1)
            .with_tool_offset(1, -10.0);
        let mut pipette = Pipette::new(1, "p300", config(), sim, deck).unwrap();
        pipette.add_tip_rack(TipRack::new(slots, 59.3, 10.5));
        pipette
    }

    #[test]
    fn test_pickup_sequence() {
        let mut pipette = pipette(3);
        pipette.pickup_tip(None).unwrap();

        let journal = pipette.controller().journal();
        assert!(matches!(journal[0], MotionCommand::RetractToSafeHeight { .. }));
        assert_eq!(journal[1].absolute(Axis::X), Some(100.0));
        assert!(journal[2].is_probe());
        assert_eq!(journal[2].to_string(), "G1 Z20 F800 H4");
        assert_eq!(journal[3].to_string(), "G10 P1 Z-58.8");
        assert_eq!(journal[4].absolute(Axis::Z), Some(160.0));

        assert!(pipette.state().has_tip());
        assert!((pipette.controller().live_tool_offset(1) + 58.8).abs() < 1e-9);
        // 拾取不移动库存
        assert_eq!(pipette.tip_inventory().unwrap().cursor(), 1);
    }

    #[test]
    fn test_double_pickup_issues_nothing() {
        let mut pipette = pipette(3);
        pipette.pickup_tip(None).unwrap();
        let before = pipette.controller().journal().len();

        let err = pipette.pickup_tip(None).unwrap_err();
        assert!(matches!(err, PipetteError::TipAlreadyAttached));
        assert_eq!(pipette.controller().journal().len(), before);
    }

    #[test]
    fn test_pickup_without_rack() {
        let sim = SimulatedController::new()
            .with_active_tool(1)
            .with_tool_offset(1, -10.0);
        let mut pipette = Pipette::new(1, "p300", config(), sim, Deck::new()).unwrap();

        let err = pipette.pickup_tip(None).unwrap_err();
        assert!(matches!(err, PipetteError::NoTipRack));
        assert!(pipette.controller().journal().is_empty());

        // 指定位置可以拾取，z 偏移保持基准值
        pipette
            .pickup_tip(Some(&Location::point(40.0, 30.0, 25.0)))
            .unwrap();
        assert!(pipette.state().has_tip());
        assert_eq!(pipette.controller().journal()[3].to_string(), "G10 P1 Z-10");
        assert!((pipette.controller().live_tool_offset(1) + 10.0).abs() < 1e-9);
        assert!(pipette.tip_inventory().is_none());
    }

    #[test]
    fn test_drop_tip_advances_and_restores_offset() {
        let mut pipette = pipette(3);
        pipette.pickup_tip(None).unwrap();
        pipette.controller_mut().take_journal();

        pipette.drop_tip(None).unwrap();
        let journal = pipette.controller().journal();
        assert_eq!(
            journal[0],
            MotionCommand::MoveTo(MoveTarget::plunger(9.5).with_speed(4000.0))
        );
        assert_eq!(journal[1].absolute(Axis::V), Some(0.0));
        assert_eq!(journal[2].to_string(), "G10 P1 Z-10");

        assert!(!pipette.state().has_tip());
        assert_eq!(pipette.tip_inventory().unwrap().cursor(), 2);
        assert_eq!(
            pipette.state().next_tip().and_then(Location::well_ref).map(|w| w.well.as_str()),
            Some("B1")
        );
    }

    #[test]
    fn test_drop_tip_at_location_moves_xy_only() {
        let mut pipette = pipette(3);
        pipette.pickup_tip(None).unwrap();
        pipette.controller_mut().take_journal();

        pipette
            .drop_tip(Some(&Location::point(300.0, 10.0, 0.0)))
            .unwrap();
        let journal = pipette.controller().journal();
        assert!(matches!(journal[0], MotionCommand::RetractToSafeHeight { .. }));
        assert_eq!(journal[1], MotionCommand::MoveTo(MoveTarget::xy(300.0, 10.0)));
        assert!(journal.iter().all(|c| c.absolute(Axis::Z).is_none()));
    }

    #[test]
    fn test_drop_last_tip_reports_exhaustion() {
        let mut pipette = pipette(1);
        pipette.pickup_tip(None).unwrap();

        let err = pipette.drop_tip(None).unwrap_err();
        assert!(matches!(err, PipetteError::InventoryExhausted(_)));
        assert!(err.is_precondition());

        // 吸头已弹出，偏移已恢复
        assert!(!pipette.state().has_tip());
        assert!((pipette.controller().live_tool_offset(1) + 10.0).abs() < 1e-9);
        assert!(pipette.state().next_tip().is_none());
        assert!(matches!(
            pipette.pickup_tip(None),
            Err(PipetteError::InventoryExhausted(_))
        ));
    }

    #[test]
    fn test_return_tip_keeps_cursor() {
        let mut pipette = pipette(3);
        pipette.pickup_tip(None).unwrap();
        pipette.controller_mut().take_journal();

        pipette.return_tip(None).unwrap();
        let journal = pipette.controller().journal();
        assert_eq!(journal[1].absolute(Axis::X), Some(100.0));
        assert_eq!(journal[2].relative(Axis::Z), Some(-25.0));
        assert_eq!(journal[3].absolute(Axis::V), Some(9.5));
        assert_eq!(journal[4].relative(Axis::Z), Some(25.0));
        assert_eq!(journal[5].absolute(Axis::V), Some(0.0));

        assert!(!pipette.state().has_tip());
        assert_eq!(pipette.tip_inventory().unwrap().cursor(), 1);
        assert_eq!(
            pipette.state().next_tip().and_then(Location::well_ref).map(|w| w.well.as_str()),
            Some("A1")
        );
    }

    #[test]
    fn test_drop_and_return_require_tip() {
        let mut pipette = pipette(3);
        assert!(matches!(
            pipette.drop_tip(None),
            Err(PipetteError::NoTipAttached)
        ));
        assert!(matches!(
            pipette.return_tip(None),
            Err(PipetteError::NoTipAttached)
        ));
        assert!(pipette.controller().journal().is_empty());
    }

    #[test]
    fn test_inactive_tool_rejected_first() {
        let mut pipette = pipette(3);
        pipette.controller_mut().set_active_tool(Some(2));
        assert!(matches!(
            pipette.pickup_tip(None),
            Err(PipetteError::ToolNotActive { tool: 1 })
        ));
        assert!(pipette.controller().journal().is_empty());
    }
}
