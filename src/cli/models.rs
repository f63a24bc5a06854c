// ============================================================================
// CardGen - CLI Models 命令
// ============================================================================
//
// 文件: src/cli/models.rs
// 职责: 供应商模型列表命令的 CLI 接口层
// 边界:
//   - ✅ 命令行参数定义和解析
//   - ✅ 调用供应商模型列表接口
//   - ✅ 模型列表格式化输出
//   - ❌ 不应包含供应商协议细节
//   - ❌ 不应包含配置读写逻辑
//
// ============================================================================

use anyhow::Result;
use clap::Args;

use crate::models::config::Config;
use crate::models::request::ProviderKind;
use crate::providers::fetch_models;
use crate::ui::spinner::Spinner;
use crate::utils::constants::icons;
use crate::utils::logger::Logger;
use crate::{t, tf};

/// 模型列表命令参数
#[derive(Debug, Args)]
pub struct ModelsArgs {
    /// Provider (gemini, openai, openrouter, perplexity)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// API key (overrides config and environment)
    #[arg(long)]
    pub api_key: Option<String>,

    /// 输出格式 (table, json)
    #[arg(short = 'f', long, default_value = "table")]
    pub format: String,
}

pub async fn handle_models(args: ModelsArgs) -> Result<()> {
    let provider = args
        .provider
        .as_deref()
        .map(ProviderKind::from_str)
        .unwrap_or_else(Config::get_selected_provider);

    let api_key = args
        .api_key
        .clone()
        .or_else(|| Config::api_key_for(&provider));

    let spinner = if Config::get_show_progress() && !Config::get_verbose() {
        let mut spinner = Spinner::new(t!("cli-models-start"));
        spinner.start();
        Some(spinner)
    } else {
        Logger::info(t!("cli-models-start"));
        None
    };

    let models = fetch_models(&provider, api_key).await;

    if let Some(mut spinner) = spinner {
        spinner.stop();
    }

    let models = models?;

    if models.is_empty() {
        Logger::warn(t!("cli-models-none"));
        return Ok(());
    }

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
        _ => {
            for model in &models {
                Logger::info(format!("{} {}", icons::PROVIDER, model));
            }
        }
    }

    Logger::success(tf!(
        "cli-models-found",
        count = models.len(),
        provider = provider.as_str()
    ));

    Ok(())
}
