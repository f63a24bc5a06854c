// ============================================================================
// CardGen - 配置数据模型
// ============================================================================
//
// 文件: src/models/config.rs
// 职责: 配置文件数据结构定义和操作
// 边界:
//   - ✅ 配置文件数据结构定义
//   - ✅ 配置序列化/反序列化
//   - ✅ 配置验证和默认值
//   - ✅ 配置文件读写操作
//   - ✅ API 密钥存取与掩码处理
//   - ❌ 不应包含配置应用逻辑
//   - ❌ 不应包含业务规则验证
//   - ❌ 不应包含 CLI 参数处理
//   - ❌ 不应包含网络请求逻辑
//
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::models::request::ProviderKind;
use crate::utils::constants::{CONFIG_FILE, LOCALES_DIR};

/// 全局配置管理器
static GLOBAL_CONFIG: std::sync::OnceLock<Arc<RwLock<Config>>> = std::sync::OnceLock::new();

/// CardGen 配置文件结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 供应商配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 生成配置
    #[serde(default)]
    pub generation: GenerationConfig,
    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
    /// 国际化配置
    #[serde(default)]
    pub i18n: I18nConfig,
    /// 语言目录配置
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// 供应商配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 默认使用的供应商
    #[serde(default)]
    pub selected: String,
    /// 首选模型（空表示使用供应商默认模型）
    #[serde(default)]
    pub preferred_model: String,
    /// 默认最大卡片数
    #[serde(default)]
    pub default_max_cards: u32,
    /// 各供应商 API 密钥
    #[serde(default)]
    pub api_keys: Vec<ProviderKeyEntry>,
}

/// 单个供应商的密钥记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderKeyEntry {
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// 展示层已掩码（保存时保留既有密钥）
    #[serde(default)]
    pub masked: bool,
}

/// 生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// 生成卡片的目标笔记类型名称
    #[serde(default)]
    pub note_type: String,
    /// 生成卡片的目标牌组名称
    #[serde(default)]
    pub deck: String,
    /// 网络请求超时（秒）
    #[serde(default)]
    pub timeout: u32,
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 是否显示进度动画
    #[serde(default)]
    pub show_progress: bool,
    /// 是否详细输出
    #[serde(default)]
    pub verbose: bool,
    /// 是否彩色输出
    #[serde(default)]
    pub colored: bool,
}

/// 国际化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// 界面语言
    #[serde(default)]
    pub language: String,
}

/// 语言目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 语言文件目录
    #[serde(default)]
    pub locales_dir: String,
}

/// CLI 运行时参数（用于覆盖配置文件）
#[derive(Debug, Clone, Default)]
pub struct RuntimeArgs {
    pub verbose: Option<bool>,
    pub colored: Option<bool>,
    pub show_progress: Option<bool>,
    pub timeout: Option<u32>,
    pub language: Option<String>,
}

/// 配置默认值 trait - 不依赖全局配置初始化
pub trait ConfigDefaults {
    /// 获取默认供应商
    fn default_provider() -> String {
        ProviderKind::Gemini.as_str().to_string()
    }

    /// 获取默认最大卡片数
    fn default_max_cards() -> u32 {
        10
    }

    /// 获取默认笔记类型名称
    fn default_note_type() -> String {
        "Basic".to_string()
    }

    /// 获取默认牌组名称
    fn default_deck() -> String {
        "Default".to_string()
    }

    /// 获取默认请求超时（秒）
    fn default_timeout() -> u32 {
        120
    }

    /// 获取默认是否显示进度动画
    fn default_show_progress() -> bool {
        true
    }

    /// 获取默认是否详细输出
    fn default_verbose() -> bool {
        false
    }

    /// 获取默认是否彩色输出
    fn default_colored() -> bool {
        true
    }

    /// 获取默认语言文件目录
    fn default_locales_dir() -> String {
        LOCALES_DIR.to_string()
    }
}

impl ConfigDefaults for Config {}

impl Config {
    /// 初始化全局配置（程序启动时调用）
    pub fn initialize() -> anyhow::Result<()> {
        let config = Self::load_config()?;
        GLOBAL_CONFIG
            .set(Arc::new(RwLock::new(config)))
            .map_err(|_| anyhow::anyhow!("Global config already initialized"))?;
        Ok(())
    }

    /// 加载配置文件
    fn load_config() -> anyhow::Result<Self> {
        let config_path = PathBuf::from(CONFIG_FILE);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.ensure_defaults();
            Ok(config)
        } else {
            // 如果配置文件不存在，使用默认配置
            Ok(Self::default())
        }
    }

    /// 合并运行时参数
    pub fn merge_runtime_args(args: RuntimeArgs) -> anyhow::Result<()> {
        let global_config = GLOBAL_CONFIG
            .get()
            .ok_or_else(|| anyhow::anyhow!("Global config not initialized"))?;

        let mut config = global_config
            .write()
            .map_err(|_| anyhow::anyhow!("Failed to acquire config write lock"))?;

        // 合并参数
        if let Some(verbose) = args.verbose {
            config.output.verbose = verbose;
        }
        if let Some(colored) = args.colored {
            config.output.colored = colored;
        }
        if let Some(show_progress) = args.show_progress {
            config.output.show_progress = show_progress;
        }
        if let Some(timeout) = args.timeout {
            config.generation.timeout = timeout;
        }
        if let Some(language) = args.language {
            config.i18n.language = language;
        }

        Ok(())
    }

    /// 补齐缺失的供应商密钥记录
    pub fn ensure_defaults(&mut self) {
        let mut map: BTreeMap<String, ProviderKeyEntry> = self
            .provider
            .api_keys
            .drain(..)
            .map(|entry| (entry.provider.clone(), entry))
            .collect();

        for kind in ProviderKind::all() {
            map.entry(kind.as_str().to_string())
                .or_insert_with(|| ProviderKeyEntry {
                    provider: kind.as_str().to_string(),
                    api_key: None,
                    masked: false,
                });
        }

        self.provider.api_keys = map.into_values().collect();
    }

    /// 保存配置到文件
    ///
    /// 掩码记录不携带明文密钥，保存时从磁盘上的旧文件取回既有密钥。
    pub fn save_to_file(&self, config_path: &PathBuf) -> anyhow::Result<()> {
        let mut merged = self.clone();

        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            if let Ok(previous) = toml::from_str::<Config>(&content) {
                let map: BTreeMap<String, ProviderKeyEntry> = previous
                    .provider
                    .api_keys
                    .into_iter()
                    .map(|entry| (entry.provider.clone(), entry))
                    .collect();

                for entry in merged.provider.api_keys.iter_mut() {
                    if entry.masked && entry.api_key.is_none() {
                        if let Some(old) = map.get(&entry.provider) {
                            entry.api_key = old.api_key.clone();
                            entry.masked = old.masked || old.api_key.is_some();
                        }
                    }
                }
            }
        }

        let content = toml::to_string_pretty(&merged)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// 保存当前全局配置到默认配置文件
    pub fn persist() -> anyhow::Result<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE);
        let snapshot = Self::snapshot()?;
        snapshot.save_to_file(&path)?;
        Ok(path)
    }

    /// 生成默认配置模板
    pub fn generate_default_template() -> Self {
        let mut config = Self::default();
        config.ensure_defaults();
        config
    }

    /// 生成默认配置模板并保存到文件
    pub fn create_default_config_file(config_path: &PathBuf) -> anyhow::Result<()> {
        let default_config = Self::generate_default_template();
        default_config.save_to_file(config_path)?;
        Ok(())
    }

    /// 获取当前全局配置的完整快照
    pub fn snapshot() -> anyhow::Result<Config> {
        let global_config = GLOBAL_CONFIG
            .get()
            .ok_or_else(|| anyhow::anyhow!("Global config not initialized"))?;

        let config = global_config
            .read()
            .map_err(|_| anyhow::anyhow!("Failed to acquire config read lock"))?;

        Ok(config.clone())
    }

    /// 修改全局配置
    pub fn update<F>(mutate: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Config),
    {
        let global_config = GLOBAL_CONFIG
            .get()
            .ok_or_else(|| anyhow::anyhow!("Global config not initialized"))?;

        let mut config = global_config
            .write()
            .map_err(|_| anyhow::anyhow!("Failed to acquire config write lock"))?;

        mutate(&mut config);
        Ok(())
    }

    /// 获取界面语言
    pub fn get_language() -> anyhow::Result<String> {
        Ok(Self::snapshot()?.i18n.language)
    }

    /// 获取是否彩色输出
    pub fn get_colored() -> anyhow::Result<bool> {
        Ok(Self::snapshot()?.output.colored)
    }

    /// 获取详细输出设置（带默认值）
    pub fn get_verbose() -> bool {
        match Self::snapshot() {
            Ok(config) => config.output.verbose,
            _ => Self::default_verbose(),
        }
    }

    /// 获取是否显示进度动画（带默认值）
    pub fn get_show_progress() -> bool {
        match Self::snapshot() {
            Ok(config) => config.output.show_progress,
            _ => Self::default_show_progress(),
        }
    }

    /// 获取请求超时（带默认值，秒）
    pub fn get_timeout() -> u32 {
        match Self::snapshot() {
            Ok(config) if config.generation.timeout > 0 => config.generation.timeout,
            _ => Self::default_timeout(),
        }
    }

    /// 获取语言文件目录（带默认值）
    pub fn get_locales_dir() -> PathBuf {
        match Self::snapshot() {
            Ok(config) if !config.catalog.locales_dir.trim().is_empty() => {
                PathBuf::from(config.catalog.locales_dir)
            }
            _ => PathBuf::from(Self::default_locales_dir()),
        }
    }

    /// 获取默认选中的供应商（带默认值）
    pub fn get_selected_provider() -> ProviderKind {
        match Self::snapshot() {
            Ok(config) if !config.provider.selected.trim().is_empty() => {
                ProviderKind::from_str(config.provider.selected.trim())
            }
            _ => ProviderKind::from_str(&Self::default_provider()),
        }
    }

    /// 获取首选模型
    pub fn get_preferred_model() -> Option<String> {
        Self::snapshot()
            .ok()
            .map(|config| config.provider.preferred_model)
            .filter(|model| !model.trim().is_empty())
    }

    /// 获取默认最大卡片数
    pub fn get_default_max_cards() -> Option<u32> {
        Self::snapshot()
            .ok()
            .map(|config| config.provider.default_max_cards)
            .filter(|value| *value > 0)
    }

    /// 获取目标笔记类型名称
    pub fn get_note_type() -> Option<String> {
        Self::snapshot()
            .ok()
            .map(|config| config.generation.note_type)
            .filter(|name| !name.trim().is_empty())
    }

    /// 获取目标牌组名称
    pub fn get_deck() -> Option<String> {
        Self::snapshot()
            .ok()
            .map(|config| config.generation.deck)
            .filter(|name| !name.trim().is_empty())
    }

    /// 获取指定供应商的 API 密钥
    ///
    /// 环境变量 CARDGEN_<PROVIDER>_API_KEY 优先于配置文件。
    pub fn api_key_for(provider: &ProviderKind) -> Option<String> {
        if let Some(key) = Self::api_key_from_env(provider) {
            return Some(key);
        }

        Self::snapshot().ok().and_then(|config| {
            config
                .provider
                .api_keys
                .iter()
                .find(|entry| entry.provider == provider.as_str())
                .and_then(|entry| entry.api_key.clone())
                .filter(|key| !key.trim().is_empty())
        })
    }

    /// 从环境变量读取 API 密钥
    pub fn api_key_from_env(provider: &ProviderKind) -> Option<String> {
        let name = format!(
            "CARDGEN_{}_API_KEY",
            provider.as_str().to_ascii_uppercase()
        );
        std::env::var(name)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// 更新指定供应商的 API 密钥
    pub fn update_api_key(provider: &ProviderKind, api_key: &str) -> anyhow::Result<()> {
        let trimmed = api_key.trim().to_string();
        Self::update(|config| {
            config.ensure_defaults();
            for entry in config.provider.api_keys.iter_mut() {
                if entry.provider == provider.as_str() {
                    entry.api_key = if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.clone())
                    };
                    entry.masked = entry.api_key.is_some();
                }
            }
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
            output: OutputConfig::default(),
            i18n: I18nConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            selected: Config::default_provider(),
            preferred_model: String::new(),
            default_max_cards: Config::default_max_cards(),
            api_keys: Vec::new(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            note_type: Config::default_note_type(),
            deck: Config::default_deck(),
            timeout: Config::default_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_progress: Config::default_show_progress(),
            verbose: Config::default_verbose(),
            colored: Config::default_colored(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            // 留空表示未设置，语言解析落到系统语言一步
            language: String::new(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            locales_dir: Config::default_locales_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_defaults_seeds_all_providers() {
        let mut config = Config::default();
        config.ensure_defaults();

        let names: Vec<&str> = config
            .provider
            .api_keys
            .iter()
            .map(|entry| entry.provider.as_str())
            .collect();
        assert_eq!(names, vec!["gemini", "openai", "openrouter", "perplexity"]);
    }

    #[test]
    fn ensure_defaults_keeps_existing_keys() {
        let mut config = Config::default();
        config.provider.api_keys.push(ProviderKeyEntry {
            provider: "gemini".to_string(),
            api_key: Some("secret".to_string()),
            masked: true,
        });
        config.ensure_defaults();

        let gemini = config
            .provider
            .api_keys
            .iter()
            .find(|entry| entry.provider == "gemini")
            .unwrap();
        assert_eq!(gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.provider.api_keys.len(), 4);
    }

    #[test]
    fn masked_entries_survive_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardgen.toml");

        // 首次保存：带明文密钥
        let mut original = Config::default();
        original.ensure_defaults();
        for entry in original.provider.api_keys.iter_mut() {
            if entry.provider == "openai" {
                entry.api_key = Some("sk-stored".to_string());
                entry.masked = true;
            }
        }
        original.save_to_file(&path).unwrap();

        // 二次保存：掩码记录不携带密钥，应保留磁盘上的值
        let mut masked = Config::default();
        masked.ensure_defaults();
        for entry in masked.provider.api_keys.iter_mut() {
            if entry.provider == "openai" {
                entry.api_key = None;
                entry.masked = true;
            }
        }
        masked.save_to_file(&path).unwrap();

        let reloaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let openai = reloaded
            .provider
            .api_keys
            .iter()
            .find(|entry| entry.provider == "openai")
            .unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-stored"));
        assert!(openai.masked);
    }

    #[test]
    fn env_var_key_wins_over_config() {
        std::env::set_var("CARDGEN_OPENROUTER_API_KEY", "  sk-env  ");
        let key = Config::api_key_from_env(&ProviderKind::OpenRouter);
        std::env::remove_var("CARDGEN_OPENROUTER_API_KEY");

        assert_eq!(key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn default_template_round_trips_through_toml() {
        let template = Config::generate_default_template();
        let content = toml::to_string_pretty(&template).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();

        assert_eq!(parsed.provider.selected, "gemini");
        assert_eq!(parsed.provider.default_max_cards, 10);
        assert_eq!(parsed.catalog.locales_dir, "locales");
        assert_eq!(parsed.provider.api_keys.len(), 4);
    }

    #[test]
    fn default_config_leaves_language_unset() {
        // 语言默认留空，解析链才会走到系统语言探测一步
        assert!(Config::default().i18n.language.is_empty());

        let template = Config::generate_default_template();
        let content = toml::to_string_pretty(&template).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert!(parsed.i18n.language.is_empty());
    }
}
