// ============================================================================
// CardGen - 生成请求数据模型
// ============================================================================
//
// 文件: src/models/request.rs
// 职责: 闪卡生成请求相关数据结构定义
// 边界:
//   - ✅ 供应商类型枚举定义
//   - ✅ 输入载荷数据结构定义
//   - ✅ 生成约束和请求结构定义
//   - ✅ 供应商响应结构定义
//   - ❌ 不应包含网络请求逻辑
//   - ❌ 不应包含提示词构建逻辑
//   - ❌ 不应包含配置读写操作
//
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::note::GeneratedField;

/// 可用于闪卡生成的 AI 供应商
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    OpenRouter,
    Perplexity,
    /// 编译期未知的供应商占位
    Custom(String),
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Perplexity => "perplexity",
            ProviderKind::Custom(value) => value.as_str(),
        }
    }

    pub fn from_str(value: &str) -> ProviderKind {
        match value {
            "gemini" => ProviderKind::Gemini,
            "openai" => ProviderKind::OpenAi,
            "openrouter" => ProviderKind::OpenRouter,
            "perplexity" => ProviderKind::Perplexity,
            other => ProviderKind::Custom(other.to_string()),
        }
    }

    /// 全部内置供应商
    pub fn all() -> &'static [ProviderKind] {
        &[
            ProviderKind::Gemini,
            ProviderKind::OpenAi,
            ProviderKind::OpenRouter,
            ProviderKind::Perplexity,
        ]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 用户提供的输入数据
#[derive(Debug, Clone)]
pub enum InputPayload {
    Text(String),
    Url(String),
    File(FilePayload),
}

/// 用户提供的文件
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub data: Vec<u8>,
    pub mimetype: Option<String>,
}

impl FilePayload {
    pub fn new(filename: String, data: Vec<u8>, mimetype: Option<String>) -> Self {
        Self {
            filename,
            data,
            mimetype,
        }
    }
}

/// 约束闪卡生成方式的可选提示
#[derive(Debug, Clone, Default)]
pub struct GenerationConstraints {
    pub max_cards: Option<u32>,
    pub note_type: Option<String>,
    pub use_default_note_type: bool,
    pub deck: Option<String>,
    pub prompt_override: Option<String>,
    pub model_override: Option<String>,
}

/// 传递给供应商层的完整请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub provider: ProviderKind,
    pub input: InputPayload,
    pub constraints: GenerationConstraints,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub style_examples: Vec<StyleExample>,
}

impl GenerationRequest {
    pub fn new(
        provider: ProviderKind,
        input: InputPayload,
        constraints: GenerationConstraints,
        api_key: Option<String>,
        model: Option<String>,
        style_examples: Vec<StyleExample>,
    ) -> Self {
        Self {
            provider,
            input,
            constraints,
            api_key,
            model,
            style_examples,
        }
    }
}

/// 解析为笔记之前的供应商原始响应
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub raw_output: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// 用于提示词的风格示例卡片
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleExample {
    pub fields: Vec<GeneratedField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trips_through_str() {
        for kind in ProviderKind::all() {
            assert_eq!(&ProviderKind::from_str(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_provider_becomes_custom() {
        let kind = ProviderKind::from_str("mistral");
        assert_eq!(kind, ProviderKind::Custom("mistral".to_string()));
        assert_eq!(kind.as_str(), "mistral");
    }
}
