// ============================================================================
// CardGen - 日志工具
// ============================================================================
//
// 文件: src/utils/logger.rs
// 职责: 日志输出和格式化工具
// 边界:
//   - ✅ 日志级别管理
//   - ✅ 日志格式化输出
//   - ✅ 日志初始化配置
//   - ✅ 控制台输出控制
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含文件日志写入
//   - ❌ 不应包含日志内容生成
//   - ❌ 不应包含特定领域逻辑
//
// ============================================================================

use tracing_subscriber::EnvFilter;

use super::colors::Colors;

/// 简单的日志工具
pub struct Logger;

impl Logger {
    pub fn info<S: AsRef<str>>(msg: S) {
        println!("{} {}", Colors::info("[CARDGEN]"), msg.as_ref());
    }

    pub fn warn<S: AsRef<str>>(msg: S) {
        println!("{} {}", Colors::warn("[WARN]"), msg.as_ref());
    }

    pub fn error<S: AsRef<str>>(msg: S) {
        eprintln!("{} {}", Colors::error("[ERROR]"), msg.as_ref());
    }

    pub fn success<S: AsRef<str>>(msg: S) {
        println!("{} {}", Colors::success("[CARDGEN]"), msg.as_ref());
    }

    /// 获取指定级别的日志前缀（供 spinner 等组件复用）
    pub fn get_prefix(level: &str) -> String {
        match level {
            "WARN" => Colors::warn("[WARN]"),
            "ERROR" => Colors::error("[ERROR]"),
            _ => Colors::info("[CARDGEN]"),
        }
    }

    /// 初始化 tracing 诊断日志（--verbose 时输出 debug 级别）
    pub fn init_tracing(verbose: bool) {
        let default_level = if verbose { "cardgen=debug" } else { "cardgen=warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .try_init();
    }
}
