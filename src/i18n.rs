// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持意大利语（默认）和英语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 注意: rust-i18n 的初始语言为 "en"，首次使用时切换到默认语言
// ==========================================

use once_cell::sync::Lazy;

/// 默认语言
pub const DEFAULT_LOCALE: &str = "it";

static DEFAULT_LOCALE_APPLIED: Lazy<()> = Lazy::new(|| rust_i18n::set_locale(DEFAULT_LOCALE));

/// 未显式设置语言时应用默认语言（只执行一次）
fn ensure_default_locale() {
    Lazy::force(&DEFAULT_LOCALE_APPLIED);
}

/// 获取当前语言
pub fn current_locale() -> String {
    ensure_default_locale();
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"it" 或 "en"）
pub fn set_locale(locale: &str) {
    ensure_default_locale();
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use dr_margin_tool::i18n::t;
/// let msg = t("error.unexpected");
/// ```
pub fn t(key: &str) -> String {
    ensure_default_locale();
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use dr_margin_tool::i18n::t_with_args;
/// let msg = t_with_args("error.missing_columns", &[("columns", "quantità")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    ensure_default_locale();
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
