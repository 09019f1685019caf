//! # Pipette CLI
//!
//! Command-line dry-run tool for motorized pipette protocols.
//!
//! 所有动作都在模拟平台上执行，输出对应的 G-code，用于在上真机之前检查协议。
//!
//! ```bash
//! # 校验移液器配置
//! pipette-cli config check p300.json
//!
//! # 体积换算
//! pipette-cli convert --config p300.json --volume 100
//!
//! # 执行协议脚本并打印 G-code
//! pipette-cli run protocol.json --config p300.json --index 1 --gcode
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod script;

use commands::{ConfigCommand, ConvertCommand, RunCommand};

/// Pipette CLI - 移液器命令行工具
#[derive(Parser, Debug)]
#[command(name = "pipette-cli")]
#[command(about = "Command-line dry-run tool for motorized pipette protocols", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 体积 → 柱塞位移换算
    Convert {
        #[command(flatten)]
        args: ConvertCommand,
    },

    /// 在模拟平台上执行协议脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pipette_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(),
        Commands::Convert { args } => args.execute(),
        Commands::Run { args } => args.execute(),
    }
}
