// ============================================================================
// CardGen - 语言目录检查器
// ============================================================================
//
// 文件: src/core/catalog.rs
// 职责: Fluent 语言文件扫描与数据一致性检查
// 边界:
//   - ✅ 语言文件扫描和解析
//   - ✅ 重复键与空值检测
//   - ✅ 跨语言完整性对比
//   - ✅ 占位符配平与一致性检测
//   - ❌ 不应包含翻译渲染逻辑
//   - ❌ 不应包含结果表格输出
//   - ❌ 不应包含 CLI 参数处理
//
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

/// 单个语言文件解析结果
#[derive(Debug, Clone)]
pub struct LocaleFile {
    pub locale: String,
    pub path: PathBuf,
    pub entries: BTreeMap<String, String>,
    pub duplicates: Vec<DuplicateKey>,
}

/// 同一文件内的重复键
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateKey {
    pub locale: String,
    pub key: String,
    pub count: usize,
}

/// 值为空的键
#[derive(Debug, Clone, Serialize)]
pub struct EmptyValue {
    pub locale: String,
    pub key: String,
}

/// 翻译缺口：键在部分语言中缺失
#[derive(Debug, Clone, Serialize)]
pub struct TranslationGap {
    pub key: String,
    pub present_in: Vec<String>,
    pub missing_from: Vec<String>,
}

/// 占位符问题（花括号不配平或变量集不一致）
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderIssue {
    pub key: String,
    pub locale: String,
    pub detail: String,
}

/// 目录检查汇总报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogReport {
    pub locales: Vec<String>,
    pub duplicate_keys: Vec<DuplicateKey>,
    pub empty_values: Vec<EmptyValue>,
    pub translation_gaps: Vec<TranslationGap>,
    pub placeholder_issues: Vec<PlaceholderIssue>,
}

impl CatalogReport {
    /// 是否存在硬性错误（缺口之外的问题）
    pub fn has_errors(&self) -> bool {
        !self.duplicate_keys.is_empty()
            || !self.empty_values.is_empty()
            || !self.placeholder_issues.is_empty()
    }

    /// 是否存在翻译缺口
    pub fn has_gaps(&self) -> bool {
        !self.translation_gaps.is_empty()
    }
}

/// 语言目录检查器
pub struct CatalogChecker {
    locales_dir: PathBuf,
}

impl CatalogChecker {
    pub fn new(locales_dir: PathBuf) -> Self {
        Self { locales_dir }
    }

    /// 扫描目录下的全部 .ftl 文件
    pub fn scan(&self) -> anyhow::Result<Vec<LocaleFile>> {
        if !self.locales_dir.exists() {
            anyhow::bail!("locales directory not found: {}", self.locales_dir.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.locales_dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("ftl") {
                continue;
            }

            let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(path)?;
            let file = parse_locale_file(locale, path, &content);
            debug!(locale = %file.locale, keys = file.entries.len(), "locale file parsed");
            files.push(file);
        }

        files.sort_by(|a, b| a.locale.cmp(&b.locale));
        Ok(files)
    }

    /// 执行全部检查并生成报告
    pub fn check(&self) -> anyhow::Result<CatalogReport> {
        let files = self.scan()?;
        Ok(build_report(&files))
    }
}

/// 解析一个 Fluent 文件为扁平键值表
///
/// 仅支持本目录使用的扁平子集：`key = value` 行、`#` 注释行、空行分隔，
/// 以及缩进的续行（追加到上一个键的值）。
fn parse_locale_file(locale: &str, path: &Path, content: &str) -> LocaleFile {
    let mut entries: BTreeMap<String, String> = BTreeMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut current_key: Option<String> = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            current_key = None;
            continue;
        }

        if line.trim_start().starts_with('#') {
            current_key = None;
            continue;
        }

        // 缩进行是上一条消息的续行
        if line.starts_with(char::is_whitespace) {
            if let Some(key) = &current_key {
                if let Some(value) = entries.get_mut(key) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(line.trim());
                }
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            current_key = None;
            continue;
        };

        let key = key.trim().to_string();
        if key.is_empty() {
            current_key = None;
            continue;
        }

        *counts.entry(key.clone()).or_insert(0) += 1;
        entries.insert(key.clone(), value.trim().to_string());
        current_key = Some(key);
    }

    let duplicates = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| DuplicateKey {
            locale: locale.to_string(),
            key,
            count,
        })
        .collect();

    LocaleFile {
        locale: locale.to_string(),
        path: path.to_path_buf(),
        entries,
        duplicates,
    }
}

/// 汇总全部检查结果
fn build_report(files: &[LocaleFile]) -> CatalogReport {
    let mut report = CatalogReport {
        locales: files.iter().map(|file| file.locale.clone()).collect(),
        ..Default::default()
    };

    for file in files {
        report.duplicate_keys.extend(file.duplicates.clone());

        for (key, value) in &file.entries {
            if value.trim().is_empty() {
                report.empty_values.push(EmptyValue {
                    locale: file.locale.clone(),
                    key: key.clone(),
                });
            }
        }
    }

    report.translation_gaps = find_translation_gaps(files);
    report.placeholder_issues = find_placeholder_issues(files);
    report
}

/// 完整性检查：任一语言中存在的键必须在所有语言中存在
fn find_translation_gaps(files: &[LocaleFile]) -> Vec<TranslationGap> {
    let mut all_keys: BTreeSet<&String> = BTreeSet::new();
    for file in files {
        all_keys.extend(file.entries.keys());
    }

    let mut gaps = Vec::new();
    for key in all_keys {
        let present_in: Vec<String> = files
            .iter()
            .filter(|file| file.entries.contains_key(key))
            .map(|file| file.locale.clone())
            .collect();
        let missing_from: Vec<String> = files
            .iter()
            .filter(|file| !file.entries.contains_key(key))
            .map(|file| file.locale.clone())
            .collect();

        if !missing_from.is_empty() {
            gaps.push(TranslationGap {
                key: key.clone(),
                present_in,
                missing_from,
            });
        }
    }

    gaps
}

/// 占位符检查：花括号配平 + 同一键的变量集跨语言一致
fn find_placeholder_issues(files: &[LocaleFile]) -> Vec<PlaceholderIssue> {
    let mut issues = Vec::new();

    for file in files {
        for (key, value) in &file.entries {
            let open = value.matches('{').count();
            let close = value.matches('}').count();
            if open != close {
                issues.push(PlaceholderIssue {
                    key: key.clone(),
                    locale: file.locale.clone(),
                    detail: format!("unbalanced braces ({open} opening, {close} closing)"),
                });
            }
        }
    }

    // 以第一个声明该键的语言作为变量集基准
    let mut reference: BTreeMap<&String, (&str, BTreeSet<String>)> = BTreeMap::new();
    for file in files {
        for (key, value) in &file.entries {
            let variables = placeholder_variables(value);
            match reference.get(key) {
                None => {
                    reference.insert(key, (file.locale.as_str(), variables));
                }
                Some((base_locale, base_variables)) => {
                    if &variables != base_variables {
                        issues.push(PlaceholderIssue {
                            key: key.clone(),
                            locale: file.locale.clone(),
                            detail: format!(
                                "placeholder variables {:?} differ from {:?} in {}",
                                variables, base_variables, base_locale
                            ),
                        });
                    }
                }
            }
        }
    }

    issues
}

/// 提取值中引用的 `{ $var }` 变量名集合
fn placeholder_variables(value: &str) -> BTreeSet<String> {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\{\s*\$([A-Za-z][A-Za-z0-9_-]*)\s*\}").expect("valid placeholder pattern")
    });

    pattern
        .captures_iter(value)
        .map(|capture| capture[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_locale(dir: &Path, locale: &str, content: &str) {
        fs::write(dir.join(format!("{locale}.ftl")), content).unwrap();
    }

    fn checker(dir: &Path) -> CatalogChecker {
        CatalogChecker::new(dir.to_path_buf())
    }

    #[test]
    fn flags_missing_provider_key_in_second_locale() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            "ai-generation-provider-openai = OpenAI\nai-generation-generate-button = Generate\n",
        );
        write_locale(
            dir.path(),
            "zh-CN",
            "ai-generation-generate-button = 生成\n",
        );

        let report = checker(dir.path()).check().unwrap();
        assert_eq!(report.translation_gaps.len(), 1);
        let gap = &report.translation_gaps[0];
        assert_eq!(gap.key, "ai-generation-provider-openai");
        assert_eq!(gap.present_in, vec!["en-US".to_string()]);
        assert_eq!(gap.missing_from, vec!["zh-CN".to_string()]);
    }

    #[test]
    fn detects_duplicate_keys_within_one_file() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            "ai-generation-tab-text = Text\nai-generation-tab-text = Text again\n",
        );

        let report = checker(dir.path()).check().unwrap();
        assert_eq!(report.duplicate_keys.len(), 1);
        assert_eq!(report.duplicate_keys[0].key, "ai-generation-tab-text");
        assert_eq!(report.duplicate_keys[0].count, 2);
        assert!(report.has_errors());
    }

    #[test]
    fn detects_empty_values() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(dir.path(), "en-US", "ai-generation-clear-button =\n");

        let report = checker(dir.path()).check().unwrap();
        assert_eq!(report.empty_values.len(), 1);
        assert_eq!(report.empty_values[0].key, "ai-generation-clear-button");
    }

    #[test]
    fn detects_unbalanced_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            "check-locales-found = Found { $count locale files\n",
        );

        let report = checker(dir.path()).check().unwrap();
        assert_eq!(report.placeholder_issues.len(), 1);
        assert!(report.placeholder_issues[0].detail.contains("unbalanced"));
    }

    #[test]
    fn detects_placeholder_variable_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            "cli-generate-summary = Generated { $count } cards in { $seconds }s\n",
        );
        write_locale(
            dir.path(),
            "zh-CN",
            "cli-generate-summary = 已生成 { $count } 张卡片\n",
        );

        let report = checker(dir.path()).check().unwrap();
        assert_eq!(report.placeholder_issues.len(), 1);
        assert_eq!(report.placeholder_issues[0].key, "cli-generate-summary");
        assert_eq!(report.placeholder_issues[0].locale, "zh-CN");
    }

    #[test]
    fn comments_and_sections_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_locale(
            dir.path(),
            "en-US",
            "### interface text\n\n## Buttons\n\nai-generation-generate-button = Generate\n",
        );

        let report = checker(dir.path()).check().unwrap();
        assert!(!report.has_errors());
        assert!(!report.has_gaps());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(checker(&missing).check().is_err());
    }

    #[test]
    fn shipped_catalog_is_consistent_apart_from_known_gaps() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("locales");
        let report = checker(&dir).check().unwrap();

        assert!(report.duplicate_keys.is_empty());
        assert!(report.empty_values.is_empty());
        assert!(report.placeholder_issues.is_empty());

        // zh-CN 落后 en-US 的已知缺口
        let gap_keys: Vec<&str> = report
            .translation_gaps
            .iter()
            .map(|gap| gap.key.as_str())
            .collect();
        assert!(gap_keys.contains(&"ai-generation-provider-openai"));
        for gap in &report.translation_gaps {
            assert_eq!(gap.missing_from, vec!["zh-CN".to_string()]);
        }
    }
}
