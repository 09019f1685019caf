//! 转移计划
//!
//! 每次 `transfer` 调用构造一个计划：一个源、至少一个目标、体积，
//! 以及可选的混合、吹出和换吸头策略。

use crate::labware::Location;

/// 混合参数：循环次数 + 每次体积
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MixSpec {
    pub cycles: u32,
    pub volume: f64,
}

impl MixSpec {
    pub fn new(cycles: u32, volume: f64) -> Self {
        Self { cycles, volume }
    }
}

/// 换吸头策略
///
/// 当前版本只接受并记录该参数，不在目标之间更换吸头。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NewTipPolicy {
    #[default]
    Always,
    Never,
    Once,
}

/// 吹出位置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlowoutTarget {
    /// 在刚排液的目标孔吹出
    InPlace,
    /// 移动到指定孔后吹出
    At(Location),
}

/// 转移计划
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    volume: f64,
    source: Location,
    destinations: Vec<Location>,
    mix_before: Option<MixSpec>,
    mix_after: Option<MixSpec>,
    blowout: Option<BlowoutTarget>,
    new_tip: NewTipPolicy,
}

impl TransferPlan {
    /// 单目标计划
    pub fn new(volume: f64, source: Location, destination: Location) -> Self {
        Self {
            volume,
            source,
            destinations: vec![destination],
            mix_before: None,
            mix_after: None,
            blowout: None,
            new_tip: NewTipPolicy::default(),
        }
    }

    /// 追加目标（按追加顺序访问）
    pub fn to(mut self, destination: Location) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn mix_before(mut self, cycles: u32, volume: f64) -> Self {
        self.mix_before = Some(MixSpec::new(cycles, volume));
        self
    }

    pub fn mix_after(mut self, cycles: u32, volume: f64) -> Self {
        self.mix_after = Some(MixSpec::new(cycles, volume));
        self
    }

    pub fn blowout(mut self, target: BlowoutTarget) -> Self {
        self.blowout = Some(target);
        self
    }

    pub fn new_tip(mut self, policy: NewTipPolicy) -> Self {
        self.new_tip = policy;
        self
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    /// 目标列表（非空）
    pub fn destinations(&self) -> &[Location] {
        &self.destinations
    }

    pub fn mix_before_spec(&self) -> Option<MixSpec> {
        self.mix_before
    }

    pub fn mix_after_spec(&self) -> Option<MixSpec> {
        self.mix_after
    }

    pub fn blowout_target(&self) -> Option<&BlowoutTarget> {
        self.blowout.as_ref()
    }

    pub fn new_tip_policy(&self) -> NewTipPolicy {
        self.new_tip
    }
}
