// ============================================================================
// CardGen - CLI Check 命令
// ============================================================================
//
// 文件: src/cli/check.rs
// 职责: 语言目录检查命令的 CLI 接口层
// 边界:
//   - ✅ 命令行参数定义和解析
//   - ✅ 调用核心检查器执行检查
//   - ✅ 检查结果格式化输出
//   - ✅ 用户交互和提示信息
//   - ❌ 不应包含具体检查逻辑
//   - ❌ 不应包含文件扫描逻辑
//   - ❌ 不应包含数据模型定义
//
// ============================================================================

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::core::catalog::{CatalogChecker, CatalogReport};
use crate::models::config::Config;
use crate::ui::summary;
use crate::utils::logger::Logger;
use crate::{t, tf};

use super::output_results;

/// 目录检查命令参数
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Directory containing the .ftl locale files
    #[arg(long)]
    pub locales_dir: Option<PathBuf>,

    /// 输出格式 (table, json)
    #[arg(short = 'f', long, default_value = "table")]
    pub format: String,

    /// Treat translation gaps as errors
    #[arg(short, long)]
    pub strict: bool,

    /// 显示详细信息
    #[arg(short = 'd', long)]
    pub detail: bool,
}

pub fn handle_check(args: CheckArgs) -> Result<()> {
    Logger::info(t!("cli-check-start"));

    let locales_dir = args
        .locales_dir
        .clone()
        .unwrap_or_else(Config::get_locales_dir);
    let verbose = Config::get_verbose();

    if !locales_dir.exists() {
        anyhow::bail!(tf!(
            "error-locales-dir-missing",
            dir = locales_dir.display().to_string()
        ));
    }

    if verbose {
        Logger::info(tf!("check-scanning", dir = locales_dir.display().to_string()));
    }

    let checker = CatalogChecker::new(locales_dir.clone());
    let report = checker.check()?;

    if report.locales.is_empty() {
        anyhow::bail!(tf!(
            "check-no-locales",
            dir = locales_dir.display().to_string()
        ));
    }

    Logger::info(tf!("check-locales-found", count = report.locales.len()));

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_tables(&report, &args)?;
    }

    if report.has_errors() || (args.strict && report.has_gaps()) {
        std::process::exit(1);
    }

    if !report.has_gaps() {
        Logger::success(t!("check-all-good"));
    }

    Ok(())
}

/// 按问题类别输出检查结果表格
fn print_report_tables(report: &CatalogReport, args: &CheckArgs) -> Result<()> {
    if !report.duplicate_keys.is_empty() {
        Logger::error(tf!(
            "check-duplicates-found",
            count = report.duplicate_keys.len()
        ));
        output_results(
            &args.format,
            report.duplicate_keys.as_slice(),
            args.detail,
            |duplicates, detail| summary::print_duplicate_keys_table(duplicates, detail),
        )?;
    }

    if !report.empty_values.is_empty() {
        Logger::error(tf!("check-empty-found", count = report.empty_values.len()));
        output_results(
            &args.format,
            report.empty_values.as_slice(),
            args.detail,
            |empties, detail| summary::print_empty_values_table(empties, detail),
        )?;
    }

    if !report.placeholder_issues.is_empty() {
        Logger::error(tf!(
            "check-placeholders-found",
            count = report.placeholder_issues.len()
        ));
        output_results(
            &args.format,
            report.placeholder_issues.as_slice(),
            args.detail,
            |issues, detail| summary::print_placeholder_issues_table(issues, detail),
        )?;
    }

    if !report.translation_gaps.is_empty() {
        Logger::warn(tf!(
            "check-missing-found",
            count = report.translation_gaps.len()
        ));
        output_results(
            &args.format,
            report.translation_gaps.as_slice(),
            args.detail,
            |gaps, detail| summary::print_translation_gaps_table(gaps, detail),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(dir: &std::path::Path) -> CheckArgs {
        CheckArgs {
            locales_dir: Some(dir.to_path_buf()),
            format: "table".to_string(),
            strict: false,
            detail: false,
        }
    }

    #[test]
    fn empty_locales_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(handle_check(args_for(dir.path())).is_err());
    }

    #[test]
    fn directory_without_ftl_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a locale file").unwrap();
        assert!(handle_check(args_for(dir.path())).is_err());
    }
}
