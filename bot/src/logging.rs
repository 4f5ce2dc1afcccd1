//! ロギング初期化
//!
//! `DOWNDETECTOR_LOG_LEVEL`（未設定なら `RUST_LOG`）でフィルタを指定する。デフォルトは `info`。
//! `DOWNDETECTOR_LOG_DIR` が設定されている場合は日次ローテーションのファイルにも出力する。

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "downdetector-bot.log";

/// 旧ログディレクトリ変数名
const LEGACY_LOG_DIR_VAR: &str = "LOG_DIR";

/// 環境変数から解決したログ設定
#[derive(Debug, PartialEq)]
struct LogSettings {
    directives: String,
    log_dir: Option<PathBuf>,
    legacy_log_dir: bool,
}

impl LogSettings {
    /// サブスクライバー登録前に呼ぶので、ここではログを出さない
    fn from_env() -> Self {
        let directives = env_value("DOWNDETECTOR_LOG_LEVEL")
            .or_else(|| env_value("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        let (log_dir, legacy_log_dir) = match env_value("DOWNDETECTOR_LOG_DIR") {
            Some(dir) => (Some(PathBuf::from(dir)), false),
            None => match env_value(LEGACY_LOG_DIR_VAR) {
                Some(dir) => (Some(PathBuf::from(dir)), true),
                None => (None, false),
            },
        };

        Self {
            directives,
            log_dir,
            legacy_log_dir,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// ロギングを初期化する
///
/// ファイル出力を有効にした場合、戻り値のガードが破棄されるまでバッファが書き出される。
/// `main` の終わりまで保持すること。
pub fn init() -> Result<Option<WorkerGuard>, String> {
    let settings = LogSettings::from_env();
    let filter = build_filter(&settings.directives)?;

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {}", e))?;

    if settings.legacy_log_dir {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use 'DOWNDETECTOR_LOG_DIR' instead",
            LEGACY_LOG_DIR_VAR
        );
    }

    Ok(guard)
}

fn build_filter(directives: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(directives)
        .map_err(|e| format!("invalid log filter '{}': {}", directives, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "DOWNDETECTOR_LOG_LEVEL",
            "RUST_LOG",
            "DOWNDETECTOR_LOG_DIR",
            LEGACY_LOG_DIR_VAR,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_build_filter_accepts_levels_and_directives() {
        assert!(build_filter("info").is_ok());
        assert!(build_filter("downdetector_bot=debug,reqwest=warn").is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        assert!(build_filter("downdetector_bot=loud").is_err());
    }

    #[test]
    #[serial]
    fn test_settings_default_to_info_without_file() {
        clear_env();

        let settings = LogSettings::from_env();

        assert_eq!(settings.directives, "info");
        assert_eq!(settings.log_dir, None);
        assert!(!settings.legacy_log_dir);
    }

    #[test]
    #[serial]
    fn test_rust_log_is_plain_fallback() {
        clear_env();
        std::env::set_var("RUST_LOG", "debug");
        let settings = LogSettings::from_env();

        std::env::set_var("DOWNDETECTOR_LOG_LEVEL", "warn");
        let overridden = LogSettings::from_env();
        clear_env();

        assert_eq!(settings.directives, "debug");
        assert!(!settings.legacy_log_dir);
        assert_eq!(overridden.directives, "warn");
    }

    #[test]
    #[serial]
    fn test_legacy_log_dir_is_flagged_for_warning() {
        clear_env();
        std::env::set_var(LEGACY_LOG_DIR_VAR, "/tmp/dd-legacy");
        let legacy = LogSettings::from_env();

        std::env::set_var("DOWNDETECTOR_LOG_DIR", "/tmp/dd-logs");
        let current = LogSettings::from_env();
        clear_env();

        assert_eq!(legacy.log_dir, Some(PathBuf::from("/tmp/dd-legacy")));
        assert!(legacy.legacy_log_dir);
        assert_eq!(current.log_dir, Some(PathBuf::from("/tmp/dd-logs")));
        assert!(!current.legacy_log_dir);
    }
}
