// ============================================================================
// CardGen - AI 供应商模块
// ============================================================================
//
// 文件: src/providers/mod.rs
// 职责: 供应商接口定义与公共辅助逻辑
// 边界:
//   - ✅ 供应商 trait 定义
//   - ✅ 供应商工厂与模型列表分发
//   - ✅ 提示词构建和密钥校验
//   - ✅ HTTP 客户端构造
//   - ❌ 不应包含具体供应商协议实现
//   - ❌ 不应包含输入内容提取逻辑
//   - ❌ 不应包含响应解析逻辑
//
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::core::error::{GenResult, GenerationError};
use crate::core::input::ProcessedInput;
use crate::models::config::Config;
use crate::models::request::{
    GenerationConstraints, GenerationRequest, ProviderKind, ProviderResponse, StyleExample,
};
use crate::tf;

pub mod gemini;
pub mod openai;
pub mod openrouter;
pub mod perplexity;

/// 闪卡生成供应商接口
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        input: &ProcessedInput,
    ) -> GenResult<ProviderResponse>;
}

/// 按供应商类型构造实现
pub fn provider_factory(
    provider: &ProviderKind,
    api_key: Option<String>,
    model: Option<String>,
) -> GenResult<Box<dyn AiProvider>> {
    match provider {
        ProviderKind::Gemini => Ok(Box::new(gemini::GeminiProvider::new(api_key, model)?)),
        ProviderKind::OpenAi => Ok(Box::new(openai::OpenAiProvider::new(api_key, model)?)),
        ProviderKind::OpenRouter => Ok(Box::new(openrouter::OpenRouterProvider::new(
            api_key, model,
        )?)),
        ProviderKind::Perplexity => Ok(Box::new(perplexity::PerplexityProvider::new(
            api_key, model,
        )?)),
        ProviderKind::Custom(name) => Err(GenerationError::invalid(tf!(
            "error-unknown-provider",
            name = name
        ))),
    }
}

/// 列出指定供应商的可用模型
pub async fn fetch_models(provider: &ProviderKind, api_key: Option<String>) -> GenResult<Vec<String>> {
    match provider {
        ProviderKind::Gemini => {
            let key = require_api_key("Gemini", api_key)?;
            gemini::list_models(&key).await
        }
        ProviderKind::OpenAi => {
            let key = require_api_key("OpenAI", api_key)?;
            openai::list_models(&key).await
        }
        ProviderKind::OpenRouter => {
            let key = require_api_key("OpenRouter", api_key)?;
            openrouter::list_models(&key).await
        }
        ProviderKind::Perplexity => {
            let key = require_api_key("Perplexity", api_key)?;
            perplexity::list_models(&key).await
        }
        ProviderKind::Custom(name) => Err(GenerationError::invalid(tf!(
            "error-unknown-provider",
            name = name
        ))),
    }
}

/// 带配置超时的 HTTP 客户端
pub fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(u64::from(Config::get_timeout())))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// 构建用户提示词
pub(crate) fn build_flashcard_prompt(
    input: &ProcessedInput,
    constraints: &GenerationConstraints,
    style_examples: &[StyleExample],
) -> String {
    let requested_cards = constraints
        .max_cards
        .filter(|cards| *cards > 0)
        .unwrap_or(10);

    let source_line = input
        .source_url
        .as_ref()
        .map(|url| format!("Source URL: {url}\n"))
        .unwrap_or_default();

    let prompt_override = constraints
        .prompt_override
        .as_ref()
        .map(|override_text| format!("Additional instructions:\n{override_text}\n\n"))
        .unwrap_or_default();

    let style_section = build_style_section(style_examples);

    format!(
        "You are an expert study coach generating Anki flashcards.\n\
Return a JSON array where each item has these keys: \"front\", \"back\", \"source_excerpt\", \"source_url\".\n\
Create between 3 and {requested_cards} high-quality cards covering the most important ideas.\n\
If information is missing, omit the card. Provide concise phrasing suitable for spaced repetition.\n\
{prompt_override}{style_section}Content starts below:\n<<<\n{source_line}{content}\n>>>",
        content = input.text
    )
}

/// 将风格示例渲染为提示词片段
fn build_style_section(style_examples: &[StyleExample]) -> String {
    if style_examples.is_empty() {
        return String::new();
    }

    let mut section =
        String::from("Match the tone and structure of these existing cards:\n");
    for example in style_examples {
        for field in &example.fields {
            section.push_str(&format!("{}: {}\n", field.name, field.value));
        }
        section.push('\n');
    }
    section
}

/// 校验并整理 API 密钥
pub(crate) fn require_api_key(provider_name: &str, api_key: Option<String>) -> GenResult<String> {
    match api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
    {
        Some(value) => Ok(value),
        None => Err(GenerationError::invalid(format!(
            "{provider_name} API key is required"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::GeneratedField;

    fn input_with(text: &str, url: Option<&str>) -> ProcessedInput {
        ProcessedInput {
            text: text.to_string(),
            source_url: url.map(|u| u.to_string()),
            file: None,
        }
    }

    #[test]
    fn prompt_uses_default_card_count() {
        let prompt = build_flashcard_prompt(
            &input_with("material", None),
            &GenerationConstraints::default(),
            &[],
        );
        assert!(prompt.contains("between 3 and 10"));
        assert!(prompt.contains("material"));
        assert!(!prompt.contains("Source URL"));
    }

    #[test]
    fn prompt_honors_max_cards_and_source_url() {
        let constraints = GenerationConstraints {
            max_cards: Some(25),
            ..Default::default()
        };
        let prompt = build_flashcard_prompt(
            &input_with("body", Some("https://example.com/article")),
            &constraints,
            &[],
        );
        assert!(prompt.contains("between 3 and 25"));
        assert!(prompt.contains("Source URL: https://example.com/article"));
    }

    #[test]
    fn prompt_includes_override_section() {
        let constraints = GenerationConstraints {
            prompt_override: Some("Only cover definitions".to_string()),
            ..Default::default()
        };
        let prompt = build_flashcard_prompt(&input_with("body", None), &constraints, &[]);
        assert!(prompt.contains("Additional instructions:\nOnly cover definitions"));
    }

    #[test]
    fn prompt_includes_style_examples() {
        let examples = vec![StyleExample {
            fields: vec![
                GeneratedField::new("Front", "What is mitosis?"),
                GeneratedField::new("Back", "Cell division producing identical cells"),
            ],
        }];
        let prompt =
            build_flashcard_prompt(&input_with("body", None), &GenerationConstraints::default(), &examples);
        assert!(prompt.contains("existing cards"));
        assert!(prompt.contains("Front: What is mitosis?"));
    }

    #[test]
    fn require_api_key_rejects_blank_values() {
        assert!(require_api_key("Gemini", None).is_err());
        assert!(require_api_key("Gemini", Some("   ".to_string())).is_err());
        assert_eq!(
            require_api_key("Gemini", Some("  key  ".to_string())).unwrap(),
            "key"
        );
    }

    #[test]
    fn factory_rejects_custom_providers() {
        let result = provider_factory(
            &ProviderKind::Custom("mistral".to_string()),
            Some("key".to_string()),
            None,
        );
        assert!(result.is_err());
    }
}
