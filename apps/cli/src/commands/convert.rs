//! convert 命令
//!
//! 体积 → 柱塞位移换算

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// 换算命令参数
#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 体积（uL）
    #[arg(short, long, allow_negative_numbers = true)]
    pub volume: f64,
}

impl ConvertCommand {
    pub fn execute(&self) -> Result<()> {
        let config = super::config::load(&self.config)?;
        let displacement = config.converter().volume_to_displacement(self.volume);

        println!("{} uL → {:.3} mm", self.volume, displacement);
        if !config.volume_in_range(self.volume) {
            println!(
                "⚠️  {} uL 超出 {} 量程 ({} - {} uL)",
                self.volume, config.model, config.min_volume, config.max_volume
            );
        }
        Ok(())
    }
}
