//! チャットプラットフォーム抽象
//!
//! メッセージの送信・削除・チャンネル取得だけを扱う。
//! ログインやゲートウェイ接続、コマンド登録はこの層の外側の責務。

pub mod discord;
pub mod memory;

pub use discord::DiscordClient;
pub use memory::InMemoryPlatform;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use downdetector_common::error::ChatError;
use downdetector_common::types::{ChannelId, MessageId};
use serde::{Deserialize, Serialize};

/// 送信済みメッセージへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    /// 送信先チャンネル
    pub channel_id: ChannelId,
    /// メッセージID
    pub message_id: MessageId,
}

/// チャンネル情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// チャンネルID
    pub id: ChannelId,
    /// チャンネル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 埋め込みのフィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// 見出し
    pub name: String,
    /// 値
    pub value: String,
    /// 横並び表示
    #[serde(default)]
    pub inline: bool,
}

/// 埋め込みのフッター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// フッター文言
    pub text: String,
}

/// 埋め込みメッセージ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    /// タイトル
    pub title: String,
    /// 説明文
    pub description: String,
    /// 左端の色（0xRRGGBB）
    pub color: u32,
    /// フィールド
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// フッター
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// タイムスタンプ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    /// フィールドを追加
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// 見出しでフィールドを検索
    pub fn find_field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// 送信するメッセージ本文
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// テキストのみ
    Text(String),
    /// 埋め込み
    Embed(Embed),
}

impl MessageContent {
    /// Discordのメッセージ作成リクエストボディに変換
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            MessageContent::Text(text) => serde_json::json!({ "content": text }),
            MessageContent::Embed(embed) => serde_json::json!({ "embeds": [embed] }),
        }
    }

    /// ログ出力用の要約
    pub fn summary(&self) -> &str {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Embed(embed) => &embed.title,
        }
    }
}

/// チャットプラットフォーム
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// チャンネルにメッセージを送信
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageHandle, ChatError>;

    /// メッセージを削除
    ///
    /// 既に削除済みの場合は `ChatError::MessageNotFound` を返す。
    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChatError>;

    /// チャンネルを取得（存在しない場合は `None`）
    async fn get_channel(&self, channel_id: ChannelId) -> Result<Option<Channel>, ChatError>;
}
