// ============================================================================
// CardGen - CLI Generate 命令
// ============================================================================
//
// 文件: src/cli/generate.rs
// 职责: 闪卡生成命令的 CLI 接口层
// 边界:
//   - ✅ 命令行参数定义和解析
//   - ✅ 调用生成流程并展示结果
//   - ✅ 进度显示和用户反馈
//   - ✅ 结果写入输出文件
//   - ❌ 不应包含供应商协议细节
//   - ❌ 不应包含响应解析逻辑
//   - ❌ 不应包含提示词构建逻辑
//
// ============================================================================

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use crate::core::pipeline::{GenerationOutcome, GenerationPipeline};
use crate::models::config::Config;
use crate::models::request::{
    FilePayload, GenerationConstraints, GenerationRequest, InputPayload, ProviderKind,
    StyleExample,
};
use crate::ui::spinner::Spinner;
use crate::ui::summary;
use crate::utils::logger::Logger;
use crate::{t, tf};

use super::output_results;

/// 生成命令参数
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Study material as plain text
    #[arg(short, long, conflicts_with_all = ["url", "file"])]
    pub text: Option<String>,

    /// Web page to fetch and generate cards from
    #[arg(short, long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Local file (PDF, HTML, Markdown or plain text)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Provider (gemini, openai, openrouter, perplexity)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model identifier override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum number of cards to generate
    #[arg(short = 'n', long)]
    pub max_cards: Option<u32>,

    /// Note type name to stamp onto generated cards
    #[arg(long)]
    pub note_type: Option<String>,

    /// Deck name to stamp onto generated cards
    #[arg(long)]
    pub deck: Option<String>,

    /// Extra instructions appended to the prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// API key (overrides config and environment)
    #[arg(long)]
    pub api_key: Option<String>,

    /// JSON file with example cards to imitate
    #[arg(long)]
    pub style_examples: Option<PathBuf>,

    /// 输出格式 (table, json)
    #[arg(short = 'f', long, default_value = "table")]
    pub format: String,

    /// 显示详细信息
    #[arg(short = 'd', long)]
    pub detail: bool,

    /// Write generated cards to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn handle_generate(args: GenerateArgs) -> Result<()> {
    Logger::info(t!("cli-generate-start"));

    let verbose = Config::get_verbose();
    let show_progress = Config::get_show_progress();

    let input = build_input(&args)?;
    let provider = args
        .provider
        .as_deref()
        .map(ProviderKind::from_str)
        .unwrap_or_else(Config::get_selected_provider);
    let style_examples = load_style_examples(args.style_examples.as_deref())?;

    let constraints = GenerationConstraints {
        max_cards: args.max_cards,
        note_type: args.note_type.clone(),
        use_default_note_type: args.note_type.is_none(),
        deck: args.deck.clone(),
        prompt_override: args.prompt.clone(),
        model_override: args.model.clone(),
    };

    let request = GenerationRequest::new(
        provider.clone(),
        input,
        constraints,
        args.api_key.clone(),
        args.model.clone(),
        style_examples,
    );

    // 进度动画在 verbose 模式下让位给日志输出
    let spinner = if show_progress && !verbose {
        let mut spinner = Spinner::new_with_prefix(
            Logger::get_prefix("INFO"),
            t!("ai-generation-progress-generating"),
        );
        spinner.start();
        Some(spinner)
    } else {
        None
    };

    let started = Instant::now();
    let outcome = GenerationPipeline::generate(request).await;

    if let Some(mut spinner) = spinner {
        spinner.stop();
    }

    let outcome = outcome?;

    if outcome.notes.is_empty() {
        Logger::warn(t!("ai-generation-no-cards-returned"));
        return Ok(());
    }

    if verbose {
        Logger::info(tf!(
            "cli-generate-provider",
            provider = provider.as_str(),
            model = outcome.model.as_deref().unwrap_or("default")
        ));
    }

    output_results(&args.format, &outcome.notes, args.detail, |notes, detail| {
        summary::print_preview_table(notes, detail)
    })?;

    if let Some(path) = &args.output {
        write_output_file(path, &outcome)?;
    }

    let seconds = started.elapsed().as_secs();
    Logger::success(tf!(
        "cli-generate-summary",
        count = outcome.notes.len(),
        seconds = seconds
    ));

    Ok(())
}

/// 从三种互斥的输入参数中构建输入载荷
fn build_input(args: &GenerateArgs) -> Result<InputPayload> {
    if let Some(text) = &args.text {
        return Ok(InputPayload::Text(text.clone()));
    }

    if let Some(url) = &args.url {
        if url.trim().is_empty() {
            anyhow::bail!(t!("ai-generation-error-empty-url"));
        }
        return Ok(InputPayload::Url(url.clone()));
    }

    if let Some(path) = &args.file {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if data.is_empty() {
            anyhow::bail!(t!("ai-generation-error-empty-file"));
        }
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        return Ok(InputPayload::File(FilePayload::new(filename, data, None)));
    }

    anyhow::bail!(t!("ai-generation-error-empty-text"));
}

/// 读取风格示例文件（JSON 数组，每项含 fields）
fn load_style_examples(path: Option<&std::path::Path>) -> Result<Vec<StyleExample>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let examples: Vec<StyleExample> = serde_json::from_str(&content)
        .with_context(|| format!("invalid style examples in {}", path.display()))?;

    Ok(examples)
}

/// 将生成的卡片写入 JSON 文件
fn write_output_file(path: &PathBuf, outcome: &GenerationOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(&outcome.notes)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Logger::info(tf!(
        "cli-generate-written",
        count = outcome.notes.len(),
        path = path.display().to_string()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> GenerateArgs {
        GenerateArgs {
            text: None,
            url: None,
            file: None,
            provider: None,
            model: None,
            max_cards: None,
            note_type: None,
            deck: None,
            prompt: None,
            api_key: None,
            style_examples: None,
            format: "table".to_string(),
            detail: false,
            output: None,
        }
    }

    #[test]
    fn build_input_prefers_text() {
        let mut args = base_args();
        args.text = Some("photosynthesis".to_string());

        let input = build_input(&args).unwrap();
        assert!(matches!(input, InputPayload::Text(text) if text == "photosynthesis"));
    }

    #[test]
    fn build_input_rejects_missing_input() {
        let args = base_args();
        assert!(build_input(&args).is_err());
    }

    #[test]
    fn build_input_rejects_blank_url() {
        let mut args = base_args();
        args.url = Some("   ".to_string());
        assert!(build_input(&args).is_err());
    }

    #[test]
    fn load_style_examples_defaults_to_empty() {
        let examples = load_style_examples(None).unwrap();
        assert!(examples.is_empty());
    }

    #[test]
    fn load_style_examples_parses_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(
            &path,
            r#"[{"fields": [{"name": "Front", "value": "Q"}, {"name": "Back", "value": "A"}]}]"#,
        )
        .unwrap();

        let examples = load_style_examples(Some(&path)).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].fields[0].name, "Front");
    }
}
