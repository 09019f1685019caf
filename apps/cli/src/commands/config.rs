//! 配置管理命令
//!
//! 校验移液器配置文件（JSON 或 TOML）

use anyhow::{Context, Result};
use clap::Subcommand;
use pipette_sdk::PipetteConfig;
use std::path::{Path, PathBuf};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 加载并校验配置文件
    Check {
        /// 配置文件路径（.json / .toml）
        file: PathBuf,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Check { file } => Self::check_(&file),
        }
    }

    fn check_(file: &Path) -> Result<()> {
        let config = load(file)?;

        println!("✅ 配置有效: {}", file.display());
        println!("  品牌: {}", config.brand);
        println!("  型号: {}", config.model);
        println!("  量程: {} - {} uL", config.min_volume, config.max_volume);
        println!("  归零位置: {}", config.zero_position);
        println!("  吹出位置: {}", config.blowout_position);
        println!("  弹出位置: {}", config.drop_tip_position);
        println!("  换算系数: {} mm/uL", config.mm_to_ul);
        Ok(())
    }
}

/// 加载并校验配置
pub fn load(file: &Path) -> Result<PipetteConfig> {
    let config = PipetteConfig::load_from_file(file)
        .with_context(|| format!("加载配置文件失败: {}", file.display()))?;
    config
        .validate()
        .with_context(|| format!("配置校验失败: {}", file.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"brand":"Opentrons","model":"P300","max_volume":300,"min_volume":20,
               "zero_position":0,"blowout_position":5,"drop_tip_position":9,"mm_to_ul":0.1}}"#
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.model, "P300");
    }

    #[test]
    fn test_load_rejects_inverted_range() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"brand":"Opentrons","model":"P300","max_volume":20,"min_volume":300,
               "zero_position":0,"blowout_position":5,"drop_tip_position":9,"mm_to_ul":0.1}}"#
        )
        .unwrap();

        assert!(load(file.path()).is_err());
    }
}
