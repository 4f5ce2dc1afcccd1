//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use crate::types::ChannelId;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<::config::ConfigError> for CommonError {
    fn from(err: ::config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// チャットプラットフォーム操作のエラー
#[derive(Debug, Error)]
pub enum ChatError {
    /// 削除対象のメッセージが既に存在しない
    #[error("Message not found")]
    MessageNotFound,

    /// 認証失敗
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// プラットフォームAPIがエラーを返した
    #[error("Platform API error ({status}): {message}")]
    Api {
        /// HTTPステータスコード
        status: u16,
        /// エラーメッセージ
        message: String,
    },

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// レスポンスの解釈に失敗
    #[error("Invalid platform response: {0}")]
    Decode(String),
}

/// Bot error type
#[derive(Debug, Error)]
pub enum BotError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Chat platform error
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// 未知のコマンド
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// 送信先チャンネルが未指定
    #[error("No channel specified and no monitored channel configured")]
    NoChannel,

    /// 監視チャンネルが見つからない
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Bot result type
pub type BotResult<T> = Result<T, BotError>;
