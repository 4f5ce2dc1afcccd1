//! Configuration helpers via environment variables
//!
//! Values that must never end up in `MonitorConfig` (the platform token) are
//! read here, with fallback to legacy variable names.

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use downdetector_bot::config::get_env_with_fallback;
///
/// let token = get_env_with_fallback("DOWNDETECTOR_DISCORD_TOKEN", "DISCORD_TOKEN");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Discord Botトークンを取得
///
/// 環境変数 `DOWNDETECTOR_DISCORD_TOKEN`（旧: `DISCORD_TOKEN`）から取得する。
/// 空文字列は未設定として扱う。
pub fn discord_token() -> Option<String> {
    get_env_with_fallback("DOWNDETECTOR_DISCORD_TOKEN", "DISCORD_TOKEN")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
