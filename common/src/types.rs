//! 共通型定義
//!
//! ProbeResult, ChannelId等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// プローブの判定結果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// HTTP 200 を受信
    Online,
    /// タイムアウトまでに応答なし
    Timeout,
    /// 200以外の応答、または通信エラー
    Error,
}

impl ProbeStatus {
    /// 文字列表現を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Online => "online",
            ProbeStatus::Timeout => "timeout",
            ProbeStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1回のプローブで観測した事象
///
/// 通信層で起きたことをそのまま表す。`ProbeResult::classify` で判定結果に変換する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// HTTP 200 を受信
    UpstreamOk {
        /// ステータスコード
        status_code: u16,
        /// 応答ヘッダー受信までの経過時間
        elapsed: Duration,
    },
    /// 200以外のHTTP応答を受信
    UpstreamNonOk {
        /// ステータスコード
        status_code: u16,
        /// 応答ヘッダー受信までの経過時間
        elapsed: Duration,
    },
    /// タイムアウト
    TransportTimeout,
    /// DNS・接続拒否・TLSなどの通信エラー
    TransportError(String),
}

/// プローブ結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    /// 判定結果
    pub status: ProbeStatus,
    /// HTTPステータスコード（応答を受信した場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// 応答時間（ミリ秒、小数点以下2桁）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    /// 通信エラーの説明（通信エラー時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// 判定時刻
    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// 観測結果を判定し、現在時刻を記録する
    ///
    /// 200以外の応答でも `response_time_ms` は実測値を記録する。
    pub fn classify(outcome: ProbeOutcome) -> Self {
        let timestamp = Utc::now();
        match outcome {
            ProbeOutcome::UpstreamOk {
                status_code,
                elapsed,
            } => Self {
                status: ProbeStatus::Online,
                status_code: Some(status_code),
                response_time_ms: Some(round_millis(elapsed)),
                error_message: None,
                timestamp,
            },
            ProbeOutcome::UpstreamNonOk {
                status_code,
                elapsed,
            } => Self {
                status: ProbeStatus::Error,
                status_code: Some(status_code),
                response_time_ms: Some(round_millis(elapsed)),
                error_message: None,
                timestamp,
            },
            ProbeOutcome::TransportTimeout => Self {
                status: ProbeStatus::Timeout,
                status_code: None,
                response_time_ms: None,
                error_message: None,
                timestamp,
            },
            ProbeOutcome::TransportError(message) => {
                let message = message.trim();
                Self {
                    status: ProbeStatus::Error,
                    status_code: None,
                    response_time_ms: None,
                    error_message: Some(if message.is_empty() {
                        "unknown transport error".to_string()
                    } else {
                        message.to_string()
                    }),
                    timestamp,
                }
            }
        }
    }

    /// オンラインかどうか
    pub fn is_online(&self) -> bool {
        self.status == ProbeStatus::Online
    }
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        // Discordのsnowflakeは文字列で送られてくるが、設定ファイルでは数値も許容する
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Number(u64),
                    Text(String),
                }

                match Raw::deserialize(deserializer)? {
                    Raw::Number(n) => Ok($name(n)),
                    Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

snowflake_id!(
    /// チャンネルID
    ChannelId
);

snowflake_id!(
    /// メッセージID
    MessageId
);
