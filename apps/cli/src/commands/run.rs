//! run 命令
//!
//! 在模拟平台上执行协议脚本

use anyhow::{Context, Result};
use clap::Args;
use pipette_sdk::prelude::{PipetteBuilder, SimulatedController};
use std::path::PathBuf;
use tracing::info;

use crate::script::{Script, ScriptExecutor};

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    pub script: PathBuf,

    /// 移液器配置文件
    #[arg(short, long)]
    pub config: PathBuf,

    /// 工具编号
    #[arg(short, long, default_value_t = 1)]
    pub index: u8,

    /// 甲板安全高度（mm）
    #[arg(long, default_value_t = 150.0)]
    pub safe_height: f64,

    /// 打印生成的 G-code
    #[arg(long)]
    pub gcode: bool,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,
}

impl RunCommand {
    /// 执行脚本
    pub fn execute(&self) -> Result<()> {
        println!("📜 加载脚本: {}", self.script.display());
        let script = Script::load(&self.script)?;
        let config = super::config::load(&self.config)?;

        println!("📋 脚本: {}", script.name);
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!("    {} 个命令", script.commands.len());
        println!();

        let deck = script.build_deck()?;
        let racks = script.build_tip_racks(&deck)?;
        let platform = SimulatedController::new()
            .with_safe_height(self.safe_height)
            .with_active_tool(self.index);

        let mut builder = PipetteBuilder::new(self.index, config.model.clone(), config);
        for rack in racks {
            builder = builder.tip_rack(rack);
        }
        let mut pipette = builder
            .build(platform, deck)
            .context("创建移液器失败")?;

        // Ctrl-C：在下一次坐标解析时停止
        let token = pipette.cancellation_token();
        ctrlc::set_handler(move || {
            println!("\n⏹  收到 Ctrl-C，等待当前动作完成后停止...");
            token.cancel();
        })
        .context("设置 Ctrl-C 处理器失败")?;

        info!("Running script '{}' on tool {}", script.name, self.index);
        let result = ScriptExecutor::new(self.continue_on_error).execute(&mut pipette, &script);

        if self.gcode {
            println!();
            println!("🧾 G-code:");
            for command in pipette.controller().journal() {
                println!("{command}");
            }
        }

        println!();
        println!("📊 执行结果:");
        println!("  总命令数: {}", result.total_commands);
        println!("  成功: {}", result.succeeded.len());
        println!("  失败: {}", result.failed.len());
        println!("  运动命令: {}", pipette.controller().journal().len());
        if result.cancelled {
            println!("  ⏹  已取消");
        }

        if !result.failed.is_empty() {
            println!();
            println!("❌ 失败的命令:");
            for (idx, err) in &result.failed {
                println!("  命令 {}: {}", idx + 1, err);
            }
            anyhow::bail!("{} 个命令失败", result.failed.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_creation() {
        let cmd = RunCommand {
            script: PathBuf::from("protocol.json"),
            config: PathBuf::from("p300.toml"),
            index: 2,
            safe_height: 150.0,
            gcode: true,
            continue_on_error: false,
        };

        assert_eq!(cmd.script, PathBuf::from("protocol.json"));
        assert_eq!(cmd.index, 2);
        assert!(cmd.gcode);
    }
}
