// ============================================================================
// CardGen - 常量定义
// ============================================================================
//
// 文件: src/utils/constants.rs
// 职责: 应用程序常量和配置定义
// 边界:
//   - ✅ 应用程序常量定义
//   - ✅ 像素图标字符定义
//   - ✅ UI 相关常量定义
//   - ❌ 不应包含动态配置
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含计算逻辑
//   - ❌ 不应包含文件路径处理
//
// ============================================================================

/// 默认配置文件名
pub const CONFIG_FILE: &str = "cardgen.toml";

/// 默认语言文件目录
pub const LOCALES_DIR: &str = "locales";

/// 回退语言
pub const FALLBACK_LOCALE: &str = "en-US";

/// 像素风格图标
pub mod icons {
    /// 成功图标
    pub const SUCCESS: &str = "✓";
    /// 错误图标
    pub const ERROR: &str = "✗";
    /// 卡片图标
    pub const CARD: &str = "●";
    /// 语言文件图标
    pub const LOCALE: &str = "◇";
    /// 供应商图标
    pub const PROVIDER: &str = "▸";
    /// 时间图标
    pub const TIME: &str = "⧖";
    /// 箭头图标
    pub const ARROW: &str = "→";
}

/// 加载 spinner 字符
pub mod spinner_chars {
    pub const BASE: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];
}
