// ============================================================================
// CardGen - 生成流程编排
// ============================================================================
//
// 文件: src/core/pipeline.rs
// 职责: 闪卡生成全流程编排
// 边界:
//   - ✅ 配置默认值套用
//   - ✅ 输入处理、供应商调用、结果解析的串联
//   - ✅ 生成约束应用（数量截断、笔记类型/牌组标注）
//   - ❌ 不应包含供应商协议细节
//   - ❌ 不应包含输出格式化逻辑
//   - ❌ 不应包含配置文件读写
//
// ============================================================================

use tracing::debug;

use crate::core::error::GenResult;
use crate::core::input::InputProcessor;
use crate::core::parser;
use crate::models::config::Config;
use crate::models::note::GeneratedNote;
use crate::models::request::{GenerationConstraints, GenerationRequest};
use crate::providers::provider_factory;

/// 一次生成的最终结果
pub struct GenerationOutcome {
    pub notes: Vec<GeneratedNote>,
    pub raw_response: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// 生成流程控制器
pub struct GenerationPipeline;

impl GenerationPipeline {
    pub async fn generate(request: GenerationRequest) -> GenResult<GenerationOutcome> {
        let request = Self::apply_config_defaults(request);
        debug!(provider = %request.provider, "starting generation");

        let provider = provider_factory(
            &request.provider,
            request.api_key.clone(),
            request.model.clone(),
        )?;

        let processed_input = InputProcessor::prepare(&request).await?;
        let provider_response = provider.generate(&request, &processed_input).await?;

        let mut notes = parser::parse_raw_output(&provider_response.raw_output)?;
        Self::apply_constraints(&mut notes, &request.constraints);
        debug!(cards = notes.len(), "generation finished");

        Ok(GenerationOutcome {
            notes,
            raw_response: provider_response.raw_output,
            model: provider_response.model,
            tokens_used: provider_response.tokens_used,
        })
    }

    /// 请求中缺失的字段从全局配置补齐
    fn apply_config_defaults(mut request: GenerationRequest) -> GenerationRequest {
        if request.api_key.is_none() {
            request.api_key = Config::api_key_for(&request.provider);
        }

        if request.model.is_none() {
            request.model = request
                .constraints
                .model_override
                .clone()
                .or_else(Config::get_preferred_model);
        }

        if request.constraints.max_cards.is_none() {
            request.constraints.max_cards = Config::get_default_max_cards();
        }

        if request.constraints.note_type.is_none() && request.constraints.use_default_note_type {
            request.constraints.note_type = Config::get_note_type();
        }

        if request.constraints.deck.is_none() {
            request.constraints.deck = Config::get_deck();
        }

        request
    }

    /// 应用生成约束：截断数量、标注目标、丢弃空来源
    fn apply_constraints(notes: &mut Vec<GeneratedNote>, constraints: &GenerationConstraints) {
        let max_cards = constraints
            .max_cards
            .filter(|value| *value > 0)
            .map(|value| value as usize);

        if let Some(limit) = max_cards {
            if notes.len() > limit {
                notes.truncate(limit);
            }
        }

        for note in notes.iter_mut() {
            if note.note_type.is_none() {
                note.note_type = constraints.note_type.clone();
            }

            if note.deck.is_none() {
                note.deck = constraints.deck.clone();
            }

            if let Some(source) = note.source.as_mut() {
                let url_blank = source.url.as_ref().map_or(true, |url| url.trim().is_empty());
                let excerpt_blank = source
                    .excerpt
                    .as_ref()
                    .map_or(true, |text| text.trim().is_empty());
                let title_blank = source
                    .title
                    .as_ref()
                    .map_or(true, |title| title.trim().is_empty());

                if url_blank && excerpt_blank && title_blank {
                    note.source = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::{GeneratedField, GeneratedSource};

    fn note(front: &str, back: &str) -> GeneratedNote {
        GeneratedNote::new(vec![
            GeneratedField::new("Front", front),
            GeneratedField::new("Back", back),
        ])
    }

    #[test]
    fn truncates_to_max_cards() {
        let mut notes = vec![note("1", "a"), note("2", "b"), note("3", "c")];
        let constraints = GenerationConstraints {
            max_cards: Some(2),
            ..Default::default()
        };

        GenerationPipeline::apply_constraints(&mut notes, &constraints);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn stamps_note_type_and_deck_names() {
        let mut notes = vec![note("Q", "A")];
        let constraints = GenerationConstraints {
            note_type: Some("Basic".to_string()),
            deck: Some("Biology".to_string()),
            ..Default::default()
        };

        GenerationPipeline::apply_constraints(&mut notes, &constraints);
        assert_eq!(notes[0].note_type.as_deref(), Some("Basic"));
        assert_eq!(notes[0].deck.as_deref(), Some("Biology"));
    }

    #[test]
    fn drops_all_blank_sources() {
        let mut notes = vec![note("Q", "A")];
        notes[0].source = Some(GeneratedSource {
            url: Some("  ".to_string()),
            title: None,
            excerpt: Some(String::new()),
        });

        GenerationPipeline::apply_constraints(&mut notes, &GenerationConstraints::default());
        assert!(notes[0].source.is_none());
    }

    #[test]
    fn keeps_sources_with_content() {
        let mut notes = vec![note("Q", "A")];
        notes[0].source = Some(GeneratedSource {
            url: Some("https://example.com".to_string()),
            title: None,
            excerpt: None,
        });

        GenerationPipeline::apply_constraints(&mut notes, &GenerationConstraints::default());
        assert!(notes[0].source.is_some());
    }
}
