// ============================================================================
// CardGen - OpenRouter 供应商适配
// ============================================================================
//
// 文件: src/providers/openrouter.rs
// 职责: OpenRouter Chat Completions 协议适配
// 边界:
//   - ✅ 请求/响应序列化结构定义
//   - ✅ 生成与模型列表接口实现
//   - ✅ API 错误透传
//   - ❌ 不应包含提示词构建逻辑
//   - ❌ 不应包含响应解析逻辑
//   - ❌ 不应包含配置读写
//
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::core::error::{GenResult, GenerationError};
use crate::core::input::ProcessedInput;
use crate::models::request::{GenerationRequest, ProviderResponse};

use super::{build_flashcard_prompt, http_client, require_api_key, AiProvider};

const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
const ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const MODELS_ENDPOINT: &str = "https://openrouter.ai/api/v1/models";
const SYSTEM_PROMPT: &str = "You generate Anki flashcards. Respond with a JSON array only, where each object has keys front, back, source_excerpt, source_url.";

pub struct OpenRouterProvider {
    api_key: String,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: Option<String>, model: Option<String>) -> GenResult<Self> {
        let api_key = require_api_key("OpenRouter", api_key)?;
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self { api_key, model })
    }
}

/// 列出平台聚合的模型
pub async fn list_models(api_key: &str) -> GenResult<Vec<String>> {
    let response = http_client()
        .get(MODELS_ENDPOINT)
        .bearer_auth(api_key)
        .send()
        .await?
        .error_for_status()?;

    let bytes = response.bytes().await?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| {
        GenerationError::invalid(format!("OpenRouter models response was not valid JSON: {err}"))
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|msg| msg.as_str())
            .unwrap_or("OpenRouter API returned an error while listing models");
        return Err(GenerationError::invalid(message.to_string()));
    }

    let parsed: OpenRouterModelsResponse = serde_json::from_value(value).map_err(|err| {
        GenerationError::invalid(format!("OpenRouter models response was not valid JSON: {err}"))
    })?;

    let mut models: Vec<String> = parsed
        .data
        .into_iter()
        .map(|entry| entry.id)
        .filter(|id| !id.trim().is_empty())
        .collect();

    models.sort();
    models.dedup();
    Ok(models)
}

#[async_trait::async_trait]
impl AiProvider for OpenRouterProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
        input: &ProcessedInput,
    ) -> GenResult<ProviderResponse> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        let user_prompt =
            build_flashcard_prompt(input, &request.constraints, &request.style_examples);

        let body = OpenRouterRequest {
            model: model.clone(),
            messages: vec![
                OpenRouterMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenRouterMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            max_tokens: Some(2048),
            temperature: Some(0.3),
        };

        let response = http_client()
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        let parsed: OpenRouterResponse = serde_json::from_slice(&bytes).map_err(|err| {
            GenerationError::invalid(format!("OpenRouter response was not valid JSON: {err}"))
        })?;

        if let Some(error) = parsed.error {
            let message = error
                .message
                .unwrap_or_else(|| "OpenRouter API returned an error".to_string());
            return Err(GenerationError::invalid(format!(
                "OpenRouter API error: {message}"
            )));
        }

        let raw_output = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.map(|message| message.content))
            .unwrap_or_default();

        if raw_output.trim().is_empty() {
            return Err(GenerationError::invalid(
                "OpenRouter did not return any content",
            ));
        }

        Ok(ProviderResponse {
            raw_output,
            model: Some(model),
            tokens_used: parsed
                .usage
                .and_then(|usage| usage.total_tokens.map(|value| value as u32)),
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<OpenRouterMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenRouterMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    #[serde(default)]
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    usage: Option<OpenRouterUsage>,
    #[serde(default)]
    error: Option<OpenRouterError>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: Option<OpenRouterMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessageResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    #[serde(default)]
    total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModelsResponse {
    #[serde(default)]
    data: Vec<OpenRouterModelEntry>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModelEntry {
    id: String,
}
