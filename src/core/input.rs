// ============================================================================
// CardGen - 输入内容处理
// ============================================================================
//
// 文件: src/core/input.rs
// 职责: 文本/网页/文件输入的抓取与正文提取
// 边界:
//   - ✅ URL 抓取和内容类型嗅探
//   - ✅ PDF 与 HTML 正文提取
//   - ✅ 文件 MIME 类型推断
//   - ✅ 空白字符规整
//   - ❌ 不应包含提示词构建逻辑
//   - ❌ 不应包含供应商调用逻辑
//   - ❌ 不应包含响应解析逻辑
//
// ============================================================================

use std::path::Path;

use pdf_extract::extract_text_from_mem;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use scraper::Html;
use tracing::debug;

use crate::core::error::{GenResult, GenerationError};
use crate::models::request::{FilePayload, GenerationRequest, InputPayload};
use crate::t;

/// 提取后的正文，供提示词构建使用
#[derive(Debug, Clone, Default)]
pub struct ProcessedInput {
    pub text: String,
    pub source_url: Option<String>,
    pub file: Option<FilePayload>,
}

pub struct InputProcessor;

impl InputProcessor {
    pub async fn prepare(request: &GenerationRequest) -> GenResult<ProcessedInput> {
        let mut processed = match &request.input {
            InputPayload::Text(text) => Self::process_text(text),
            InputPayload::Url(url) => Self::process_url(url).await?,
            InputPayload::File(file) => Self::process_file(file)?,
        };

        if processed.text.trim().is_empty() {
            return Err(GenerationError::invalid(t!(
                "ai-generation-error-empty-text"
            )));
        }

        // 校验通过后再做空白规整
        processed.text = normalize_whitespace(&processed.text);
        debug!(chars = processed.text.len(), "input prepared");

        Ok(processed)
    }

    fn process_text(text: &str) -> ProcessedInput {
        ProcessedInput {
            text: text.to_owned(),
            source_url: None,
            file: None,
        }
    }

    async fn process_url(url: &str) -> GenResult<ProcessedInput> {
        let client = crate::providers::http_client();
        let response = client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());
        let bytes = response.bytes().await?.to_vec();

        if is_pdf_mime(content_type.as_deref(), Some(url)) {
            let text = extract_pdf_text(&bytes)?;
            let filename = filename_from_url(url).unwrap_or_else(|| url.to_string());
            let payload = FilePayload::new(filename, bytes, Some("application/pdf".to_string()));
            Ok(ProcessedInput {
                text,
                source_url: Some(url.to_string()),
                file: Some(payload),
            })
        } else {
            let decoded = decode_text(&bytes);
            let content = if is_html_mime(content_type.as_deref()) {
                html_to_text(&decoded)
            } else {
                decoded
            };

            Ok(ProcessedInput {
                text: content,
                source_url: Some(url.to_string()),
                file: None,
            })
        }
    }

    fn process_file(file: &FilePayload) -> GenResult<ProcessedInput> {
        let mime = infer_mime(file);

        if is_pdf_mime(mime.as_deref(), None) {
            let text = extract_pdf_text(&file.data)?;
            Ok(ProcessedInput {
                text,
                source_url: None,
                file: Some(file.clone()),
            })
        } else {
            let decoded = decode_text(&file.data);
            let content = if is_html_mime(mime.as_deref()) {
                html_to_text(&decoded)
            } else {
                decoded
            };

            Ok(ProcessedInput {
                text: content,
                source_url: None,
                file: Some(file.clone()),
            })
        }
    }
}

fn decode_text(data: &[u8]) -> String {
    match String::from_utf8(data.to_vec()) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).to_string(),
    }
}

fn infer_mime(file: &FilePayload) -> Option<String> {
    if let Some(mimetype) = &file.mimetype {
        return Some(mimetype.to_ascii_lowercase());
    }

    Path::new(&file.filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some("application/pdf"),
            "html" | "htm" => Some("text/html"),
            "md" | "markdown" => Some("text/markdown"),
            "json" => Some("application/json"),
            "csv" => Some("text/csv"),
            "txt" => Some("text/plain"),
            _ => None,
        })
        .map(|s| s.to_string())
}

fn is_pdf_mime(mime: Option<&str>, url: Option<&str>) -> bool {
    if let Some(mime) = mime {
        if mime.contains("pdf") {
            return true;
        }
    }

    url.and_then(|raw| {
        Url::parse(raw).ok().and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(|name| name.ends_with(".pdf")))
        })
    })
    .unwrap_or(false)
}

fn is_html_mime(mime: Option<&str>) -> bool {
    mime.map(|value| value.contains("html")).unwrap_or(false)
}

fn extract_pdf_text(data: &[u8]) -> GenResult<String> {
    match extract_text_from_mem(data) {
        Ok(text) => Ok(text),
        Err(err) => Err(GenerationError::invalid(format!(
            "unable to read PDF input: {err}"
        ))),
    }
}

fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn filename_from_url(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .filter(|name| !name.is_empty())
}

/// 去掉多余空行，每段保留单个换行
fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !previous_blank && !normalized.is_empty() {
                normalized.push_str("\n\n");
            }
            previous_blank = true;
        } else {
            if !normalized.is_empty() && !previous_blank {
                normalized.push('\n');
            }
            normalized.push_str(trimmed);
            previous_blank = false;
        }
    }

    if normalized.is_empty() {
        text.trim().to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_mime_from_extension() {
        let file = FilePayload::new("notes.md".to_string(), b"# Heading".to_vec(), None);
        assert_eq!(infer_mime(&file).as_deref(), Some("text/markdown"));

        let file = FilePayload::new("paper.PDF".to_string(), Vec::new(), None);
        assert_eq!(infer_mime(&file).as_deref(), Some("application/pdf"));

        let file = FilePayload::new("unknown.bin".to_string(), Vec::new(), None);
        assert_eq!(infer_mime(&file), None);
    }

    #[test]
    fn explicit_mimetype_wins_over_extension() {
        let file = FilePayload::new(
            "data.txt".to_string(),
            Vec::new(),
            Some("Text/HTML".to_string()),
        );
        assert_eq!(infer_mime(&file).as_deref(), Some("text/html"));
    }

    #[test]
    fn detects_pdf_by_url_suffix() {
        assert!(is_pdf_mime(None, Some("https://example.com/files/syllabus.pdf")));
        assert!(!is_pdf_mime(None, Some("https://example.com/files/page.html")));
        assert!(is_pdf_mime(Some("application/pdf"), None));
    }

    #[test]
    fn normalizes_whitespace_between_paragraphs() {
        let raw = "  first line  \n\n\n  second line \nthird line\n\n";
        let normalized = normalize_whitespace(raw);
        assert_eq!(normalized, "first line\n\nsecond line\nthird line");
    }

    #[test]
    fn html_extraction_drops_markup() {
        let html = "<html><body><h1>Title</h1><p>Body text.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Body text."));
        assert!(!text.contains('<'));
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = FilePayload::new("empty.txt".to_string(), b"   ".to_vec(), None);
        let processed = InputProcessor::process_file(&file).unwrap();
        assert!(processed.text.trim().is_empty());
    }
}
