//! 設定管理
//!
//! MonitorConfig 設定構造体と読み込み処理
//!
//! 設定ファイル（任意）を読み込んだ後、`DOWNDETECTOR_` で始まる環境変数で上書きする。
//! プラットフォームの認証トークンはここでは扱わない。

use crate::error::CommonError;
use crate::types::ChannelId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 環境変数のプレフィックス
pub const ENV_PREFIX: &str = "DOWNDETECTOR";

/// 監視設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// 監視対象URL (デフォルト: "https://aur.archlinux.org")
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// 監視対象の表示名 (デフォルト: "AUR")
    #[serde(default = "default_target_name")]
    pub target_name: String,

    /// 通知先チャンネルID（未設定の場合は状態の記録のみ）
    #[serde(default)]
    pub channel_id: Option<ChannelId>,

    /// 定期チェック間隔（秒）(デフォルト: 600)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// プローブのタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// コマンドのプレフィックス (デフォルト: "!aur:")
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Discord REST APIのベースURL
    #[serde(default = "default_discord_api_base")]
    pub discord_api_base: String,

    /// コマンドAPIのホストアドレス (デフォルト: "127.0.0.1")
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// コマンドAPIのポート番号 (デフォルト: 8080)
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_target_url() -> String {
    "https://aur.archlinux.org".to_string()
}

fn default_target_name() -> String {
    "AUR".to_string()
}

fn default_poll_interval() -> u64 {
    600
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_command_prefix() -> String {
    "!aur:".to_string()
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            target_name: default_target_name(),
            channel_id: None,
            poll_interval_secs: default_poll_interval(),
            probe_timeout_secs: default_probe_timeout(),
            command_prefix: default_command_prefix(),
            discord_api_base: default_discord_api_base(),
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}

impl MonitorConfig {
    /// 設定ファイルと環境変数から設定を読み込む
    ///
    /// `path` が `None` の場合は環境変数とデフォルト値のみを使う。
    /// 指定されたファイルが存在しない場合はエラー。
    pub fn load(path: Option<&Path>) -> Result<Self, CommonError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let config: MonitorConfig = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        let url = self.target_url.trim();
        if url.is_empty() {
            return Err(CommonError::Validation("target_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CommonError::Validation(format!(
                "target_url must be an http(s) URL: {}",
                url
            )));
        }
        if self.command_prefix.trim().is_empty() {
            return Err(CommonError::Validation(
                "command_prefix must not be empty".into(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(CommonError::Validation(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_secs == 0 {
            return Err(CommonError::Validation(
                "probe_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// 定期チェック間隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// プローブのタイムアウト
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// コマンドAPIのバインドアドレス
    pub fn api_bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            "DOWNDETECTOR_TARGET_URL",
            "DOWNDETECTOR_CHANNEL_ID",
            "DOWNDETECTOR_POLL_INTERVAL_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::default();

        assert_eq!(config.target_url, "https://aur.archlinux.org");
        assert_eq!(config.target_name, "AUR");
        assert_eq!(config.channel_id, None);
        assert_eq!(config.poll_interval(), Duration::from_secs(600));
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
        assert_eq!(config.command_prefix, "!aur:");
        assert_eq!(config.api_bind_addr(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_monitor_config_deserialization() {
        let json = r#"{"target_url":"https://example.com","channel_id":"12345678910"}"#;
        let config: MonitorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.target_url, "https://example.com");
        assert_eq!(config.channel_id, Some(ChannelId(12345678910)));
        // デフォルト値が適用される
        assert_eq!(config.poll_interval_secs, 600);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = MonitorConfig {
            target_url: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            target_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            probe_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            command_prefix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_file_with_env_override() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "target_url = \"https://status.example.com\"\nchannel_id = 42\npoll_interval_secs = 60"
        )
        .unwrap();

        std::env::set_var("DOWNDETECTOR_POLL_INTERVAL_SECS", "120");
        let config = MonitorConfig::load(Some(file.path())).unwrap();
        clear_env();

        assert_eq!(config.target_url, "https://status.example.com");
        assert_eq!(config.channel_id, Some(ChannelId(42)));
        assert_eq!(config.poll_interval_secs, 120);
        assert_eq!(config.probe_timeout_secs, 10);
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_env() {
        clear_env();
        std::env::set_var("DOWNDETECTOR_CHANNEL_ID", "998877665544");
        let config = MonitorConfig::load(None).unwrap();
        clear_env();

        assert_eq!(config.channel_id, Some(ChannelId(998877665544)));
        assert_eq!(config.target_url, "https://aur.archlinux.org");
    }

    #[test]
    #[serial]
    fn test_load_missing_file_is_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        assert!(matches!(
            MonitorConfig::load(Some(&missing)),
            Err(CommonError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_load_invalid_values_fail_validation() {
        clear_env();
        std::env::set_var("DOWNDETECTOR_POLL_INTERVAL_SECS", "0");
        let result = MonitorConfig::load(None);
        clear_env();

        assert!(matches!(result, Err(CommonError::Validation(_))));
    }
}
