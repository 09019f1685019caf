//! 运动平台接口契约测试
//!
//! 使用自定义的 MockPlatform（共享调用日志 + 外部可切换的激活工具），
//! 验证移液器只通过 `MotionController` / `ToolActivation` 与平台交互，
//! 以及录制钩子能在另一线程收到全部命令。

use pipette_sdk::prelude::*;
use pipette_sdk::protocol::RawCommand;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// 平台调用记录
#[derive(Debug, Clone, PartialEq)]
enum Call {
    MoveTo(MoveTarget),
    MoveRelative(MoveTarget),
    Position,
    Retract,
    Raw(String),
    Wait,
}

/// MockPlatform 用于测试
struct MockPlatform {
    calls: Arc<Mutex<Vec<Call>>>,
    active: Arc<AtomicU8>,
    position: Position,
}

impl MockPlatform {
    fn new(active: u8) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicU8::new(active)),
            position: Position::default(),
        }
    }

    fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        self.calls.clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MotionController for MockPlatform {
    fn move_to(&mut self, target: &MoveTarget) -> Result<(), DriverError> {
        self.push(Call::MoveTo(*target));
        for (axis, value) in target.axes() {
            self.position.set(axis, value);
        }
        Ok(())
    }

    fn move_relative(&mut self, delta: &MoveTarget) -> Result<(), DriverError> {
        self.push(Call::MoveRelative(*delta));
        for (axis, value) in delta.axes() {
            let current = self.position.get(axis);
            self.position.set(axis, current + value);
        }
        Ok(())
    }

    fn position(&mut self) -> Result<Position, DriverError> {
        self.push(Call::Position);
        Ok(self.position)
    }

    fn retract_to_safe_height(&mut self) -> Result<(), DriverError> {
        self.push(Call::Retract);
        self.position.z = self.position.z.max(100.0);
        Ok(())
    }

    fn safe_height(&self) -> f64 {
        100.0
    }

    fn tool_z_offset(&self, _tool: u8) -> Result<f64, DriverError> {
        Ok(-2.0)
    }

    fn send_raw(&mut self, command: &RawCommand) -> Result<(), DriverError> {
        self.push(Call::Raw(command.to_string()));
        Ok(())
    }

    fn wait_for_motion_complete(&mut self) -> Result<(), DriverError> {
        self.push(Call::Wait);
        Ok(())
    }
}

impl ToolActivation for MockPlatform {
    fn is_active(&self, tool: u8) -> bool {
        self.active.load(Ordering::SeqCst) == tool
    }
}

fn p20() -> PipetteConfig {
    PipetteConfig {
        brand: "Opentrons".to_string(),
        model: "OT2 P20 Single".to_string(),
        max_volume: 20.0,
        min_volume: 1.0,
        zero_position: 1.0,
        blowout_position: 4.0,
        drop_tip_position: 8.0,
        mm_to_ul: 0.5,
    }
}

fn deck() -> Deck {
    let mut deck = Deck::new();
    deck.add_well(
        "tube",
        "A1",
        WellGeometry {
            x: 40.0,
            y: 40.0,
            z: 2.0,
            top: 42.0,
            diameter: 12.0,
        },
    );
    deck
}

#[test]
fn test_pickup_uses_platform_safe_height_and_offset() {
    let platform = MockPlatform::new(3);
    let calls = platform.calls();
    let rack = TipRack::new(vec![Location::point(5.0, 5.0, 30.0)], 32.0, 7.0);
    let mut pipette = PipetteBuilder::new(3, "p20", p20())
        .tip_rack(rack)
        .build(platform, deck())
        .unwrap();

    pipette.pickup_tip(None).unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            Call::Retract,
            Call::MoveTo(MoveTarget::xy(5.0, 5.0)),
            Call::MoveTo(MoveTarget::z(30.0).with_speed(800.0).probing()),
            Call::Raw("G10 P3 Z-27".to_string()),
            Call::MoveTo(MoveTarget::z(110.0)),
        ]
    );
}

#[test]
fn test_tool_switch_between_operations() {
    let platform = MockPlatform::new(3);
    let active = platform.active.clone();
    let calls = platform.calls();
    let mut pipette = Pipette::new(3, "p20", p20(), platform, deck()).unwrap();

    pipette.prime(None).unwrap();
    active.store(1, Ordering::SeqCst);
    let before = calls.lock().unwrap().len();

    assert!(matches!(
        pipette.prime(None),
        Err(PipetteError::ToolNotActive { tool: 3 })
    ));
    assert_eq!(calls.lock().unwrap().len(), before);
}

#[test]
fn test_stir_queries_position_then_arcs() {
    let platform = MockPlatform::new(3);
    let calls = platform.calls();
    let rack = TipRack::new(vec![Location::point(5.0, 5.0, 30.0)], 32.0, 7.0);
    let mut pipette = PipetteBuilder::new(3, "p20", p20())
        .tip_rack(rack)
        .build(platform, deck())
        .unwrap();

    pipette.pickup_tip(None).unwrap();
    pipette
        .aspirate(10.0, &Location::well("tube", "A1"), None)
        .unwrap();
    calls.lock().unwrap().clear();

    pipette.stir(1, Some(4.0)).unwrap();

    // 半径 = 6 - 2 = 4
    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            Call::Position,
            Call::MoveTo(MoveTarget::z(2.5)),
            Call::Raw("G2 X40 Y40 Z6.5 I-4 J0".to_string()),
            Call::Wait,
            Call::MoveTo(MoveTarget::z(2.5)),
        ]
    );
}

#[test]
fn test_mutable_reference_as_controller() {
    let mut platform = MockPlatform::new(3);
    let calls = platform.calls();
    {
        let mut pipette = Pipette::new(3, "p20", p20(), &mut platform, deck()).unwrap();
        pipette.prime(Some(1200.0)).unwrap();
    }
    assert_eq!(platform.position.v, 1.0);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::MoveTo(MoveTarget::plunger(1.0).with_speed(1200.0))]
    );
}

#[test]
fn test_recording_hook_receives_every_command() {
    let (hook, rx) = RecordingHook::new();
    let mut sim = SimulatedController::new().with_active_tool(1);
    sim.hooks_mut().add_callback(Arc::new(hook));

    let rack = TipRack::new(
        vec![Location::point(5.0, 5.0, 30.0), Location::point(14.0, 5.0, 30.0)],
        32.0,
        7.0,
    );
    let mut pipette = PipetteBuilder::new(1, "p20", p20())
        .tip_rack(rack)
        .build(sim, deck())
        .unwrap();

    let consumer = std::thread::spawn(move || rx.iter().collect::<Vec<MotionCommand>>());

    pipette.pickup_tip(None).unwrap();
    pipette
        .aspirate(10.0, &Location::well("tube", "A1"), None)
        .unwrap();
    pipette.drop_tip(None).unwrap();

    let journal = pipette.controller_mut().take_journal();
    // 释放平台（以及其中的发送端），接收线程随之结束
    drop(pipette);
    let recorded = consumer.join().unwrap();

    assert_eq!(recorded, journal);
}
