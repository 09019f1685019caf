//! 脚本系统
//!
//! JSON 协议脚本：甲板布局 + 吸头架 + 动作序列，在模拟平台上执行。

use anyhow::{Context, Result, bail};
use pipette_sdk::client::labware::{Deck, GridLayout, WellGeometry};
use pipette_sdk::prelude::{
    BlowoutTarget, Location, MixSpec, NewTipPolicy, Pipette, PipetteError, SimulatedController,
    TipRack, TransferPlan,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// 协议脚本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 甲板上的耗材
    #[serde(default)]
    pub deck: Vec<LabwareSpec>,

    /// 吸头架（按顺序拼接为一个库存）
    #[serde(default)]
    pub tip_racks: Vec<TipRackSpec>,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 耗材定义：规则孔阵和/或单独列出的孔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabwareSpec {
    pub name: String,
    #[serde(default)]
    pub grid: Option<GridLayout>,
    #[serde(default)]
    pub wells: BTreeMap<String, WellGeometry>,
}

/// 吸头架定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipRackSpec {
    /// 甲板上的耗材名
    pub labware: String,
    pub tip_length: f64,
    pub tip_overlap: f64,
    /// 可用的孔（为空时使用该耗材的全部孔）
    #[serde(default)]
    pub wells: Vec<String>,
}

/// 脚本命令
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptCommand {
    Prime {
        #[serde(default)]
        speed: Option<f64>,
    },
    PickupTip {
        #[serde(default)]
        tip: Option<Location>,
    },
    Aspirate {
        volume: f64,
        location: Location,
        #[serde(default)]
        speed: Option<f64>,
    },
    Dispense {
        volume: f64,
        location: Location,
        #[serde(default)]
        speed: Option<f64>,
    },
    Transfer {
        volume: f64,
        source: Location,
        destinations: Destinations,
        #[serde(default)]
        mix_before: Option<MixSpec>,
        #[serde(default)]
        mix_after: Option<MixSpec>,
        #[serde(default)]
        blowout: Option<BlowoutTarget>,
        #[serde(default)]
        new_tip: NewTipPolicy,
        #[serde(default)]
        speed: Option<f64>,
    },
    Blowout {
        #[serde(default)]
        speed: Option<f64>,
    },
    AirGap {
        volume: f64,
    },
    Mix {
        volume: f64,
        cycles: u32,
        #[serde(default)]
        speed: Option<f64>,
    },
    Stir {
        cycles: u32,
        #[serde(default)]
        height: Option<f64>,
    },
    DropTip {
        #[serde(default)]
        location: Option<Location>,
    },
    ReturnTip {
        #[serde(default)]
        location: Option<Location>,
    },
}

/// 转移目标（至少一个），解析时拒绝空列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Location>", into = "Vec<Location>")]
pub struct Destinations {
    first: Location,
    rest: Vec<Location>,
}

impl TryFrom<Vec<Location>> for Destinations {
    type Error = String;

    fn try_from(mut locations: Vec<Location>) -> Result<Self, Self::Error> {
        if locations.is_empty() {
            return Err("transfer requires at least one destination".to_string());
        }
        let first = locations.remove(0);
        Ok(Self {
            first,
            rest: locations,
        })
    }
}

impl From<Destinations> for Vec<Location> {
    fn from(destinations: Destinations) -> Self {
        let mut locations = Vec::with_capacity(destinations.rest.len() + 1);
        locations.push(destinations.first);
        locations.extend(destinations.rest);
        locations
    }
}

impl Destinations {
    /// 以这些目标构建转移计划
    pub fn plan(&self, volume: f64, source: &Location) -> TransferPlan {
        self.rest.iter().fold(
            TransferPlan::new(volume, source.clone(), self.first.clone()),
            |plan, destination| plan.to(destination.clone()),
        )
    }
}

impl ScriptCommand {
    /// 命令名（用于输出）
    pub fn label(&self) -> &'static str {
        match self {
            ScriptCommand::Prime { .. } => "prime",
            ScriptCommand::PickupTip { .. } => "pickup_tip",
            ScriptCommand::Aspirate { .. } => "aspirate",
            ScriptCommand::Dispense { .. } => "dispense",
            ScriptCommand::Transfer { .. } => "transfer",
            ScriptCommand::Blowout { .. } => "blowout",
            ScriptCommand::AirGap { .. } => "air_gap",
            ScriptCommand::Mix { .. } => "mix",
            ScriptCommand::Stir { .. } => "stir",
            ScriptCommand::DropTip { .. } => "drop_tip",
            ScriptCommand::ReturnTip { .. } => "return_tip",
        }
    }
}

impl Script {
    /// 加载脚本文件
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("读取脚本文件失败")?;
        let script: Script = serde_json::from_str(&content).context("解析脚本 JSON 失败")?;
        Ok(script)
    }

    /// 构建甲板
    pub fn build_deck(&self) -> Result<Deck> {
        let mut deck = Deck::new();
        for labware in &self.deck {
            if let Some(grid) = &labware.grid {
                deck.add_grid(&labware.name, grid)
                    .with_context(|| format!("耗材 '{}' 的孔阵无效", labware.name))?;
            }
            for (well, geometry) in &labware.wells {
                deck.add_well(&labware.name, well, *geometry);
            }
        }
        Ok(deck)
    }

    /// 构建吸头架
    pub fn build_tip_racks(&self, deck: &Deck) -> Result<Vec<TipRack>> {
        self.tip_racks
            .iter()
            .map(|spec| {
                let slots: Vec<Location> = if spec.wells.is_empty() {
                    deck.wells(&spec.labware)
                        .into_iter()
                        .map(Location::Well)
                        .collect()
                } else {
                    spec.wells
                        .iter()
                        .map(|well| Location::well(spec.labware.as_str(), well.as_str()))
                        .collect()
                };
                if slots.is_empty() {
                    bail!("吸头架 '{}' 没有可用的孔", spec.labware);
                }
                Ok(TipRack::new(slots, spec.tip_length, spec.tip_overlap))
            })
            .collect()
    }
}

/// 脚本执行器
pub struct ScriptExecutor {
    /// 失败时是否继续
    continue_on_error: bool,
}

impl ScriptExecutor {
    pub fn new(continue_on_error: bool) -> Self {
        Self { continue_on_error }
    }

    /// 执行脚本
    ///
    /// 取消总是终止执行，不受 `continue_on_error` 影响。
    pub fn execute(
        &self,
        pipette: &mut Pipette<SimulatedController, Deck>,
        script: &Script,
    ) -> ScriptResult {
        let mut result = ScriptResult {
            total_commands: script.commands.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
        };

        for (i, cmd) in script.commands.iter().enumerate() {
            println!("命令 {}/{}: {}", i + 1, result.total_commands, cmd.label());

            match execute_command(pipette, cmd) {
                Ok(()) => {
                    println!("  ✅ 成功");
                    result.succeeded.push(i);
                },

                Err(PipetteError::Cancelled) => {
                    println!("  ⏹  已取消");
                    result.cancelled = true;
                    break;
                },

                Err(err) => {
                    println!("  ❌ 失败: {}", err);
                    if err.is_motion_fault() {
                        println!("    ⚠️  运动中断，需要人工确认物理状态");
                    }
                    result.failed.push((i, err.to_string()));

                    if !self.continue_on_error {
                        println!();
                        println!("❌ 脚本执行失败，停止执行");
                        break;
                    }
                },
            }
        }

        result
    }
}

/// 执行单个命令
fn execute_command(
    pipette: &mut Pipette<SimulatedController, Deck>,
    cmd: &ScriptCommand,
) -> Result<(), PipetteError> {
    match cmd {
        ScriptCommand::Prime { speed } => pipette.prime(*speed),
        ScriptCommand::PickupTip { tip } => pipette.pickup_tip(tip.as_ref()),
        ScriptCommand::Aspirate {
            volume,
            location,
            speed,
        } => pipette.aspirate(*volume, location, *speed),
        ScriptCommand::Dispense {
            volume,
            location,
            speed,
        } => pipette.dispense(*volume, location, *speed),
        ScriptCommand::Transfer {
            volume,
            source,
            destinations,
            mix_before,
            mix_after,
            blowout,
            new_tip,
            speed,
        } => {
            let mut plan = destinations.plan(*volume, source);
            if let Some(mix) = mix_before {
                plan = plan.mix_before(mix.cycles, mix.volume);
            }
            if let Some(mix) = mix_after {
                plan = plan.mix_after(mix.cycles, mix.volume);
            }
            if let Some(target) = blowout {
                plan = plan.blowout(target.clone());
            }
            pipette.transfer(&plan.new_tip(*new_tip), *speed)
        },
        ScriptCommand::Blowout { speed } => pipette.blowout(*speed),
        ScriptCommand::AirGap { volume } => pipette.air_gap(*volume),
        ScriptCommand::Mix {
            volume,
            cycles,
            speed,
        } => pipette.mix(*volume, *cycles, *speed),
        ScriptCommand::Stir { cycles, height } => pipette.stir(*cycles, *height),
        ScriptCommand::DropTip { location } => pipette.drop_tip(location.as_ref()),
        ScriptCommand::ReturnTip { location } => pipette.return_tip(location.as_ref()),
    }
}

/// 脚本执行结果
#[derive(Debug)]
pub struct ScriptResult {
    /// 总命令数
    pub total_commands: usize,

    /// 成功的命令索引
    pub succeeded: Vec<usize>,

    /// 失败的命令索引和错误
    pub failed: Vec<(usize, String)>,

    /// 是否被 Ctrl-C 取消
    pub cancelled: bool,
}
