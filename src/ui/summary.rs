// ============================================================================
// CardGen - 结果汇总组件
// ============================================================================
//
// 文件: src/ui/summary.rs
// 职责: 生成结果与检查结果的汇总显示
// 边界:
//   - ✅ 卡片预览表格显示
//   - ✅ 目录检查结果表格显示
//   - ✅ 统计信息格式化输出
//   - ✅ 国际化文本支持
//   - ❌ 不应包含具体业务逻辑
//   - ❌ 不应包含生成执行逻辑
//   - ❌ 不应包含文件操作
//   - ❌ 不应包含数据处理逻辑
//
// ============================================================================

use anyhow::Result;
use std::io::{self, Write};

use crate::core::catalog::{DuplicateKey, EmptyValue, PlaceholderIssue, TranslationGap};
use crate::models::note::GeneratedNote;
use crate::t;
use crate::utils::constants::icons;
use crate::utils::logger::Logger;
use crate::utils::styles::TextStyles;

/// 单元格截断宽度
const CELL_WIDTH: usize = 42;

// ============================================================================
// 卡片预览显示
// ============================================================================

/// 打印生成卡片预览表格
pub fn print_preview_table(notes: &[GeneratedNote], detail: bool) -> Result<()> {
    Logger::info("");
    Logger::info(TextStyles::bold(&t!("ai-generation-preview-group")));
    Logger::info("───────────────────────────────────────");

    for (index, note) in notes.iter().enumerate() {
        if detail {
            print_detailed_note(index, note);
        } else {
            print_simple_note(index, note);
        }
    }

    let _ = io::stdout().flush();
    Ok(())
}

/// 简单模式：正面 / 背面 / 来源各一行
fn print_simple_note(index: usize, note: &GeneratedNote) {
    let front = note.field_value("front").unwrap_or_default();
    let back = note.field_value("back").unwrap_or_default();

    Logger::info(format!(
        "{} {}. {}: {}",
        icons::CARD,
        index + 1,
        t!("ai-generation-preview-column-front"),
        truncate(front)
    ));
    Logger::info(format!(
        "     {}: {}",
        t!("ai-generation-preview-column-back"),
        truncate(back)
    ));

    if let Some(url) = note.source.as_ref().and_then(|source| source.url.as_deref()) {
        Logger::info(format!(
            "     {}: {}",
            t!("ai-generation-preview-column-source"),
            url
        ));
    }
}

/// 详细模式：全部字段加来源元数据
fn print_detailed_note(index: usize, note: &GeneratedNote) {
    Logger::info(format!("{} {}.", icons::CARD, index + 1));

    for field in &note.fields {
        Logger::info(format!("     {}: {}", field.name, field.value));
    }

    if let Some(source) = &note.source {
        if let Some(url) = &source.url {
            Logger::info(format!(
                "     {} {}",
                icons::ARROW,
                url
            ));
        }
        if let Some(title) = &source.title {
            Logger::info(format!("     {} {}", icons::ARROW, title));
        }
        if let Some(excerpt) = &source.excerpt {
            Logger::info(format!("     {} {}", icons::ARROW, truncate(excerpt)));
        }
    }

    Logger::info("");
}

// ============================================================================
// 目录检查结果显示
// ============================================================================

/// 打印翻译缺口表格
pub fn print_translation_gaps_table(gaps: &[TranslationGap], detail: bool) -> Result<()> {
    Logger::info("");
    for gap in gaps {
        Logger::info(format!(
            "{} {} {} {}",
            icons::LOCALE,
            gap.key,
            icons::ARROW,
            gap.missing_from.join(", ")
        ));

        if detail {
            Logger::info(format!(
                "     {} {}",
                icons::SUCCESS,
                gap.present_in.join(", ")
            ));
        }
    }
    Ok(())
}

/// 打印重复键表格
pub fn print_duplicate_keys_table(duplicates: &[DuplicateKey], _detail: bool) -> Result<()> {
    Logger::info("");
    for duplicate in duplicates {
        Logger::info(format!(
            "{} {} ({}: {}x)",
            icons::ERROR,
            duplicate.key,
            duplicate.locale,
            duplicate.count
        ));
    }
    Ok(())
}

/// 打印空值键表格
pub fn print_empty_values_table(empties: &[EmptyValue], _detail: bool) -> Result<()> {
    Logger::info("");
    for empty in empties {
        Logger::info(format!("{} {} ({})", icons::ERROR, empty.key, empty.locale));
    }
    Ok(())
}

/// 打印占位符问题表格
pub fn print_placeholder_issues_table(issues: &[PlaceholderIssue], detail: bool) -> Result<()> {
    Logger::info("");
    for issue in issues {
        Logger::info(format!("{} {} ({})", icons::ERROR, issue.key, issue.locale));
        if detail {
            Logger::info(format!("     {}", issue.detail));
        }
    }
    Ok(())
}

/// 截断过长的单元格文本
fn truncate(text: &str) -> String {
    let mut result = String::new();
    for (count, ch) in text.chars().enumerate() {
        if count >= CELL_WIDTH {
            result.push('…');
            return result;
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text_intact() {
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn truncate_appends_ellipsis_to_long_text() {
        let long = "x".repeat(100);
        let truncated = truncate(&long);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncated.chars().count(), CELL_WIDTH + 1);
    }
}
