// ============================================================================
// CardGen - 国际化模块
// ============================================================================
//
// 文件: src/i18n/mod.rs
// 职责: 国际化支持和翻译管理
// 边界:
//   - ✅ Fluent 语言包加载和管理
//   - ✅ 翻译宏定义和实现
//   - ✅ 语言解析和切换支持
//   - ✅ 参数化翻译支持
//   - ❌ 不应包含具体翻译内容
//   - ❌ 不应包含业务逻辑
//   - ❌ 不应包含 CLI 相关逻辑
//   - ❌ 不应包含文件操作逻辑
//
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use rust_embed::RustEmbed;
use unic_langid::LanguageIdentifier;

use crate::utils::constants::FALLBACK_LOCALE;

/// 内嵌语言包目录
#[derive(RustEmbed)]
#[folder = "locales/"]
struct LocaleAsset;

/// 全局翻译目录
static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// 已加载的 Fluent 语言包集合
struct Catalog {
    bundles: HashMap<LanguageIdentifier, FluentBundle<FluentResource>>,
    available: Vec<LanguageIdentifier>,
    fallback: LanguageIdentifier,
}

impl Catalog {
    fn load() -> Catalog {
        let mut bundles = HashMap::new();
        let mut available = Vec::new();

        for file in LocaleAsset::iter() {
            let filename = file.as_ref();
            let Some(locale_str) = filename.strip_suffix(".ftl") else {
                continue;
            };
            let Ok(locale) = locale_str.parse::<LanguageIdentifier>() else {
                continue;
            };
            let Some(content) = LocaleAsset::get(filename) else {
                continue;
            };

            let source = String::from_utf8_lossy(content.data.as_ref()).to_string();
            // 内嵌语言包损坏属于打包错误，跳过该文件并继续
            let Ok(resource) = FluentResource::try_new(source) else {
                continue;
            };

            let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
            bundle.set_use_isolating(false);
            if bundle.add_resource(resource).is_ok() {
                bundles.insert(locale.clone(), bundle);
                available.push(locale);
            }
        }

        let fallback: LanguageIdentifier = FALLBACK_LOCALE
            .parse()
            .unwrap_or_else(|_| LanguageIdentifier::default());

        Catalog {
            bundles,
            available,
            fallback,
        }
    }

    fn format(&self, locale: &LanguageIdentifier, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(locale)?;
        let message = bundle.get_message(key)?;
        let pattern = message.value()?;
        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        Some(value.to_string())
    }
}

fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(Catalog::load)
}

/// 获取翻译文本
pub fn get_translation(key: &str) -> String {
    get_translation_with_args(key, None)
}

/// 获取带参数的翻译文本
pub fn get_translation_with_args(key: &str, args: Option<&FluentArgs>) -> String {
    let catalog = catalog();
    let locale = current_locale(&catalog.available, &catalog.fallback);

    if let Some(value) = catalog.format(&locale, key, args) {
        return value;
    }

    // 当前语言缺少该键时回退到 en-US，仍缺失则原样返回键名
    if locale != catalog.fallback {
        if let Some(value) = catalog.format(&catalog.fallback, key, args) {
            return value;
        }
    }

    key.to_string()
}

/// 当前生效的语言（每次都从配置获取，支持运行期切换）
fn current_locale(available: &[LanguageIdentifier], fallback: &LanguageIdentifier) -> LanguageIdentifier {
    let configured = crate::models::config::Config::get_language().ok();
    resolve_locale(configured, available).unwrap_or_else(|| fallback.clone())
}

/// 语言解析顺序: 配置（CLI 参数已合并入配置）→ 系统语言 → None
pub fn resolve_locale(
    configured: Option<String>,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    if let Some(lang_str) = configured {
        if let Ok(lang) = lang_str.parse::<LanguageIdentifier>() {
            if available.contains(&lang) {
                return Some(lang);
            }
        }
    }

    if let Some(os_locale_str) = sys_locale::get_locale() {
        if let Ok(os_lang) = os_locale_str.parse::<LanguageIdentifier>() {
            if available.contains(&os_lang) {
                return Some(os_lang);
            }
        }
    }

    None
}

/// 列出内嵌的全部语言
pub fn available_locales() -> Vec<LanguageIdentifier> {
    catalog().available.clone()
}

/// 简单翻译宏
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::get_translation($key)
    };
}

/// 带命名参数的翻译宏
#[macro_export]
macro_rules! tf {
    ($key:expr, $($name:ident = $value:expr),+ $(,)?) => {{
        let mut args = fluent_bundle::FluentArgs::new();
        $(
            args.set(stringify!($name), fluent_bundle::FluentValue::from(format!("{}", $value)));
        )+
        $crate::i18n::get_translation_with_args($key, Some(&args))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_locale_prefers_configured_language() {
        let available: Vec<LanguageIdentifier> =
            vec!["en-US".parse().unwrap(), "zh-CN".parse().unwrap()];
        let lang = resolve_locale(Some("zh-CN".to_string()), &available);
        assert_eq!(lang, Some("zh-CN".parse().unwrap()));
    }

    #[test]
    fn resolve_locale_ignores_unavailable_language() {
        let available: Vec<LanguageIdentifier> = vec!["en-US".parse().unwrap()];
        let lang = resolve_locale(Some("fr".to_string()), &available);
        // fr 未内嵌，结果取决于系统语言，但绝不会是 fr
        assert_ne!(lang, Some("fr".parse().unwrap()));
    }

    #[test]
    fn unset_language_falls_through_to_os_detection() {
        // 配置留空时不得在“已配置”一步短路；这里故意只提供一个
        // 不可能是系统语言的占位语言，解析必须落空
        let available: Vec<LanguageIdentifier> = vec!["xx".parse().unwrap()];
        assert_eq!(resolve_locale(Some(String::new()), &available), None);
        assert_eq!(resolve_locale(None, &available), None);
    }

    #[test]
    fn embedded_catalog_contains_both_locales() {
        let locales = available_locales();
        assert!(locales.contains(&"en-US".parse().unwrap()));
        assert!(locales.contains(&"zh-CN".parse().unwrap()));
    }

    #[test]
    fn missing_key_falls_back_to_key_name() {
        let value = get_translation("no-such-key-anywhere");
        assert_eq!(value, "no-such-key-anywhere");
    }

    #[test]
    fn formats_named_arguments() {
        let catalog = catalog();
        let locale: LanguageIdentifier = "en-US".parse().unwrap();
        let mut args = FluentArgs::new();
        args.set("count", fluent_bundle::FluentValue::from("3"));
        let value = catalog
            .format(&locale, "check-locales-found", Some(&args))
            .unwrap();
        assert_eq!(value, "Found 3 locale files");
    }
}
