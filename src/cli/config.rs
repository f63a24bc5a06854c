// ============================================================================
// CardGen - CLI Config 命令
// ============================================================================
//
// 文件: src/cli/config.rs
// 职责: 配置查看与修改命令的 CLI 接口层
// 边界:
//   - ✅ 命令行参数定义和解析
//   - ✅ 配置项展示（密钥掩码显示）
//   - ✅ 配置项修改和持久化
//   - ❌ 不应包含配置文件格式定义
//   - ❌ 不应包含密钥存储细节
//   - ❌ 不应包含业务逻辑处理
//
// ============================================================================

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::models::config::Config;
use crate::models::request::ProviderKind;
use crate::utils::constants::icons;
use crate::utils::logger::Logger;
use crate::utils::styles::TextStyles;
use crate::{t, tf};

/// 配置命令参数
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration
    Show,
    /// Change a configuration value
    Set(SetArgs),
}

/// 配置修改参数
#[derive(Debug, Args)]
pub struct SetArgs {
    /// Default provider (gemini, openai, openrouter, perplexity)
    #[arg(long)]
    pub provider: Option<String>,

    /// Preferred model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Default maximum number of cards
    #[arg(long)]
    pub max_cards: Option<u32>,

    /// Interface language (en-US, zh-CN)
    #[arg(long)]
    pub language: Option<String>,

    /// Note type name for generated cards
    #[arg(long)]
    pub note_type: Option<String>,

    /// Deck name for generated cards
    #[arg(long)]
    pub deck: Option<String>,

    /// Gemini API key
    #[arg(long)]
    pub gemini_key: Option<String>,

    /// OpenAI API key
    #[arg(long)]
    pub openai_key: Option<String>,

    /// OpenRouter API key
    #[arg(long)]
    pub openrouter_key: Option<String>,

    /// Perplexity API key
    #[arg(long)]
    pub perplexity_key: Option<String>,
}

pub fn handle_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Set(set_args) => set_config(set_args),
    }
}

/// 展示当前配置（密钥掩码处理）
fn show_config() -> Result<()> {
    let config = Config::snapshot()?;

    Logger::info(TextStyles::bold(&t!("config-show-title")));
    Logger::info("───────────────────────────────────────");
    Logger::info(format!(
        "{} provider        {}",
        icons::PROVIDER,
        config.provider.selected
    ));
    Logger::info(format!(
        "{} model           {}",
        icons::PROVIDER,
        display_or_unset(&config.provider.preferred_model)
    ));
    Logger::info(format!(
        "{} max_cards       {}",
        icons::CARD,
        config.provider.default_max_cards
    ));
    Logger::info(format!(
        "{} note_type       {}",
        icons::CARD,
        display_or_unset(&config.generation.note_type)
    ));
    Logger::info(format!(
        "{} deck            {}",
        icons::CARD,
        display_or_unset(&config.generation.deck)
    ));
    Logger::info(format!(
        "{} language        {}",
        icons::LOCALE,
        display_or_unset(&config.i18n.language)
    ));
    Logger::info(format!(
        "{} timeout         {}s",
        icons::TIME,
        config.generation.timeout
    ));

    Logger::info("");
    for entry in &config.provider.api_keys {
        let value = match &entry.api_key {
            Some(key) if !key.trim().is_empty() => t!("config-masked-value"),
            _ if entry.masked => t!("config-masked-value"),
            _ => t!("config-unset-value"),
        };
        Logger::info(format!("{} {:<15} {}", icons::PROVIDER, entry.provider, value));
    }

    Ok(())
}

/// 修改配置项并持久化
fn set_config(args: SetArgs) -> Result<()> {
    Config::update(|config| {
        if let Some(provider) = &args.provider {
            config.provider.selected = provider.clone();
        }
        if let Some(model) = &args.model {
            config.provider.preferred_model = model.clone();
        }
        if let Some(max_cards) = args.max_cards {
            config.provider.default_max_cards = max_cards;
        }
        if let Some(language) = &args.language {
            config.i18n.language = language.clone();
        }
        if let Some(note_type) = &args.note_type {
            config.generation.note_type = note_type.clone();
        }
        if let Some(deck) = &args.deck {
            config.generation.deck = deck.clone();
        }
    })?;

    let key_updates = [
        (ProviderKind::Gemini, &args.gemini_key),
        (ProviderKind::OpenAi, &args.openai_key),
        (ProviderKind::OpenRouter, &args.openrouter_key),
        (ProviderKind::Perplexity, &args.perplexity_key),
    ];

    for (provider, key) in key_updates {
        if let Some(key) = key {
            Config::update_api_key(&provider, key)?;
            Logger::success(tf!("config-key-updated", provider = provider.as_str()));
        }
    }

    let path = Config::persist()?;
    Logger::success(tf!("config-saved", path = path.display().to_string()));

    Ok(())
}

fn display_or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        t!("config-unset-value")
    } else {
        value.to_string()
    }
}
