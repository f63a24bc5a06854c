// ============================================================================
// CardGen - 程序入口
// ============================================================================
//
// 文件: src/main.rs
// 职责: 程序启动、全局初始化与命令分发
// 边界:
//   - ✅ 全局配置初始化
//   - ✅ 日志订阅器初始化
//   - ✅ CLI 入口调用和错误退出
//   - ❌ 不应包含命令实现逻辑
//   - ❌ 不应包含业务逻辑处理
//
// ============================================================================

mod cli;
mod core;
mod i18n;
mod models;
mod providers;
mod ui;
mod utils;

use models::config::Config;
use utils::logger::Logger;

#[tokio::main]
async fn main() {
    if let Err(error) = Config::initialize() {
        Logger::error(format!("{error}"));
        std::process::exit(1);
    }

    if let Err(error) = cli::run_cli().await {
        Logger::error(format!("{error}"));
        std::process::exit(1);
    }
}
