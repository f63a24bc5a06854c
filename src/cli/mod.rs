// ============================================================================
// CardGen - CLI 模块
// ============================================================================
//
// 文件: src/cli/mod.rs
// 职责: CLI 命令行接口模块入口和路由
// 边界:
//   - ✅ CLI 结构定义和命令枚举
//   - ✅ 命令行参数解析配置
//   - ✅ 命令路由分发
//   - ✅ 子模块导出
//   - ❌ 不应包含具体命令实现逻辑
//   - ❌ 不应包含业务逻辑处理
//   - ❌ 不应包含数据模型定义
//
// ============================================================================

pub mod check;
pub mod config;
pub mod generate;
pub mod init;
pub mod models;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::models::config::{Config, RuntimeArgs};
use check::{handle_check, CheckArgs};
use config::{handle_config, ConfigArgs};
use generate::{handle_generate, GenerateArgs};
use init::{handle_init, InitArgs};
use models::{handle_models, ModelsArgs};

/// CardGen - AI flashcard generator
#[derive(Debug, Parser)]
#[command(name = "cardgen")]
#[command(about = "Generate Anki-style flashcards from text, web pages and files with AI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Global verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Interface language (en-US, zh-CN)
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    /// Request timeout (seconds)
    #[arg(long, global = true)]
    pub timeout: Option<u32>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Commands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate flashcards from text, a URL or a file
    Generate(GenerateArgs),
    /// List models available for a provider
    Models(ModelsArgs),
    /// Show or change configuration values
    Config(ConfigArgs),
    /// Check localization catalog consistency
    Check(CheckArgs),
    /// Initialize configuration file
    Init(InitArgs),
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // 运行时参数覆盖配置文件
    let runtime_args = build_runtime_args(&cli);
    Config::merge_runtime_args(runtime_args)?;

    // 日志级别取决于合并后的 verbose 设置
    crate::utils::logger::Logger::init_tracing(Config::get_verbose());

    match cli.command {
        Commands::Generate(args) => handle_generate(args).await,
        Commands::Models(args) => handle_models(args).await,
        Commands::Config(args) => handle_config(args),
        Commands::Check(args) => handle_check(args),
        Commands::Init(args) => handle_init(args),
    }
}

/// 通用结果输出函数
fn output_results<T, F>(format: &str, data: &T, detail: bool, print_table: F) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&T, bool) -> Result<()>,
{
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        _ => {
            print_table(data, detail)?;
        }
    }
    Ok(())
}

/// 从命令行参数构建运行时配置
fn build_runtime_args(cli: &Cli) -> RuntimeArgs {
    RuntimeArgs {
        verbose: if cli.verbose { Some(true) } else { None },
        colored: if cli.no_color { Some(false) } else { None },
        show_progress: if cli.no_progress { Some(false) } else { None },
        timeout: cli.timeout,
        language: cli.language.clone(),
    }
}
