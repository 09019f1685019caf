//! # 移液器配置
//!
//! 构造后不可变的配置记录。厂商配置文件为 JSON，本工作区原生格式为 TOML，
//! 两者字段一致，加载后都会经过 [`PipetteConfig::validate`]。

use crate::constants::*;
use crate::volume::VolumeConverter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析失败
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML 解析失败
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// 不支持的文件扩展名
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// 数值约束不满足
    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        /// 字段名
        field: &'static str,
        /// 原因
        reason: String,
    },
}

/// 移液器配置
///
/// 对应厂商配置文件中的一条记录。工具编号和名称不在文件中，
/// 由调用方在构造 `Pipette` 时传入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipetteConfig {
    /// 品牌
    pub brand: String,
    /// 型号
    pub model: String,
    /// 最大体积（uL）
    pub max_volume: f64,
    /// 最小体积（uL）
    pub min_volume: f64,
    /// 柱塞零位（吸液前的起始位置）
    pub zero_position: f64,
    /// blowout 时柱塞位置
    pub blowout_position: f64,
    /// 退吸头时柱塞位置
    pub drop_tip_position: f64,
    /// 体积 → 柱塞位移换算系数（mm/uL）
    pub mm_to_ul: f64,
}

impl PipetteConfig {
    /// 校验数值约束
    ///
    /// - 所有数值必须有限
    /// - `min_volume <= max_volume`
    /// - `mm_to_ul > 0`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_volume", self.max_volume),
            ("min_volume", self.min_volume),
            ("zero_position", self.zero_position),
            ("blowout_position", self.blowout_position),
            ("drop_tip_position", self.drop_tip_position),
            ("mm_to_ul", self.mm_to_ul),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        if self.min_volume > self.max_volume {
            return Err(ConfigError::Invalid {
                field: "min_volume",
                reason: format!(
                    "min_volume {} exceeds max_volume {}",
                    self.min_volume, self.max_volume
                ),
            });
        }

        if self.mm_to_ul <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "mm_to_ul",
                reason: format!("conversion factor must be > 0, got {}", self.mm_to_ul),
            });
        }

        Ok(())
    }

    /// 从 JSON 文本加载（厂商格式）
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本加载
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载，按扩展名选择格式（`.json` / `.toml`）
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// 体积换算器
    pub fn converter(&self) -> VolumeConverter {
        VolumeConverter::new(self.mm_to_ul)
    }

    /// 体积是否在 `[min_volume, max_volume]` 内
    ///
    /// 仅供调用方参考，吸液/排液本身不做此检查。
    pub fn volume_in_range(&self, volume: f64) -> bool {
        volume >= self.min_volume && volume <= self.max_volume
    }
}

/// 各动作的默认速度（mm/min）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speeds {
    pub prime: f64,
    pub plunger: f64,
    pub transfer: f64,
    pub blowout: f64,
    pub mix: f64,
    pub eject: f64,
    pub probe: f64,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            prime: PRIME_SPEED,
            plunger: PLUNGER_SPEED,
            transfer: TRANSFER_SPEED,
            blowout: BLOWOUT_SPEED,
            mix: MIX_SPEED,
            eject: EJECT_SPEED,
            probe: PROBE_SPEED,
        }
    }
}
