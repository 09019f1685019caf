//! Builder 模式实现
//!
//! 提供链式构造 `Pipette` 实例的便捷方式。

use crate::cancel::CancellationToken;
use crate::inventory::TipRack;
use crate::state::Pipette;
use crate::types::Result;
use pipette_protocol::{PipetteConfig, Speeds};
use std::path::Path;
use tracing::debug;

/// Pipette Builder（链式构造）
///
/// # Example
///
/// ```rust
/// use pipette_client::{CancellationToken, PipetteBuilder};
/// use pipette_client::labware::Deck;
/// use pipette_driver::SimulatedController;
/// use pipette_protocol::{PipetteConfig, Speeds};
///
/// let config = PipetteConfig::from_json_str(r#"{
///     "brand": "Opentrons", "model": "P300",
///     "max_volume": 300, "min_volume": 20,
///     "zero_position": 0, "blowout_position": 5,
///     "drop_tip_position": 9, "mm_to_ul": 0.1
/// }"#).unwrap();
///
/// let token = CancellationToken::new();
/// let pipette = PipetteBuilder::new(1, "p300", config)
///     .speeds(Speeds { mix: 4000.0, ..Speeds::default() })
///     .cancellation(token.clone())
///     .build(SimulatedController::new().with_active_tool(1), Deck::new())
///     .unwrap();
///
/// assert_eq!(pipette.speeds().mix, 4000.0);
/// ```
#[derive(Debug, Clone)]
pub struct PipetteBuilder {
    index: u8,
    name: String,
    config: PipetteConfig,
    speeds: Option<Speeds>,
    cancel: Option<CancellationToken>,
    tip_racks: Vec<TipRack>,
}

impl PipetteBuilder {
    /// 创建新的 Builder
    pub fn new(index: u8, name: impl Into<String>, config: PipetteConfig) -> Self {
        Self {
            index,
            name: name.into(),
            config,
            speeds: None,
            cancel: None,
            tip_racks: Vec::new(),
        }
    }

    /// 从配置文件创建（按扩展名选择 JSON 或 TOML）
    ///
    /// # Errors
    /// - `PipetteError::Config`: 文件读取、解析或格式错误
    pub fn from_config_file<P: AsRef<Path>>(
        index: u8,
        name: impl Into<String>,
        path: P,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading pipette config from {}", path.display());
        let config = PipetteConfig::load_from_file(path)?;
        Ok(Self::new(index, name, config))
    }

    /// 设置速度表（可选，默认见 `Speeds::default()`）
    pub fn speeds(mut self, speeds: Speeds) -> Self {
        self.speeds = Some(speeds);
        self
    }

    /// 使用外部取消令牌（可选）
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 预先关联吸头架（可多次调用，按调用顺序拼接）
    pub fn tip_rack(mut self, rack: TipRack) -> Self {
        self.tip_racks.push(rack);
        self
    }

    /// 构建 Pipette 实例
    ///
    /// # Errors
    /// - `PipetteError::Config`: 配置未通过校验
    pub fn build<M, L>(self, controller: M, labware: L) -> Result<Pipette<M, L>> {
        let mut pipette = Pipette::with_options(
            self.index,
            self.name,
            self.config,
            self.speeds.unwrap_or_default(),
            self.cancel.unwrap_or_default(),
            controller,
            labware,
        )?;
        if !self.tip_racks.is_empty() {
            pipette.add_tip_racks(self.tip_racks);
        }
        Ok(pipette)
    }
}
