//! ステータス表示の整形
//!
//! プローブ結果をチャット用の埋め込みに変換する。
//! 描画には呼び出し側が保持している結果を使い、ストアを読み直さない。

use crate::chat::{Embed, EmbedFooter, MessageContent};
use downdetector_common::config::MonitorConfig;
use downdetector_common::types::{ProbeResult, ProbeStatus};

/// 正常時の色
pub const COLOR_ONLINE: u32 = 0x2ECC71;
/// タイムアウト時の色
pub const COLOR_TIMEOUT: u32 = 0xE67E22;
/// エラー時の色
pub const COLOR_ERROR: u32 = 0xE74C3C;

/// フィールド見出し: ステータスコード
pub const FIELD_STATUS_CODE: &str = "Status code";
/// フィールド見出し: 応答時間
pub const FIELD_RESPONSE_TIME: &str = "Response time";
/// フィールド見出し: エラー
pub const FIELD_ERROR: &str = "Error";
/// フィールド見出し: URL
pub const FIELD_URL: &str = "URL";

/// 埋め込みフィールド値の最大文字数（Discordの上限）
pub const FIELD_VALUE_LIMIT: usize = 1024;

const ELLIPSIS: char = '…';

/// ステータスメッセージの描画
#[derive(Debug, Clone)]
pub struct Renderer {
    target_name: String,
    target_url: String,
    command_prefix: String,
}

impl Renderer {
    /// 新しいレンダラーを作成
    pub fn new(
        target_name: impl Into<String>,
        target_url: impl Into<String>,
        command_prefix: impl Into<String>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            target_url: target_url.into(),
            command_prefix: command_prefix.into(),
        }
    }

    /// 設定から作成
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.target_name.clone(),
            config.target_url.clone(),
            config.command_prefix.clone(),
        )
    }

    /// プローブ結果を描画
    pub fn result(&self, result: &ProbeResult) -> MessageContent {
        let (icon, description, color) = match result.status {
            ProbeStatus::Online => ("✅", "The server is up and responding normally", COLOR_ONLINE),
            ProbeStatus::Timeout => ("⚠️", "The server did not respond before the timeout", COLOR_TIMEOUT),
            ProbeStatus::Error => ("❌", "The server is returning errors", COLOR_ERROR),
        };

        let mut embed = Embed {
            title: format!("{} {} server status", icon, self.target_name),
            description: description.to_string(),
            color,
            fields: Vec::new(),
            footer: Some(EmbedFooter {
                text: format!("{} Downdetector Bot", self.target_name),
            }),
            timestamp: Some(result.timestamp),
        };

        // タイムアウト時はコード・応答時間を表示しない
        if result.status != ProbeStatus::Timeout {
            if let Some(code) = result.status_code {
                embed = embed.field(FIELD_STATUS_CODE, format!("`{}`", code), true);
            }
            if let Some(ms) = result.response_time_ms {
                embed = embed.field(FIELD_RESPONSE_TIME, format!("`{}ms`", ms), true);
            }
        }
        if let Some(message) = &result.error_message {
            embed = embed.field(FIELD_ERROR, inline_code(message), false);
        }

        MessageContent::Embed(embed.field(
            FIELD_URL,
            truncate(&self.target_url, FIELD_VALUE_LIMIT),
            false,
        ))
    }

    /// まだ結果がないときの表示
    pub fn no_data(&self) -> MessageContent {
        MessageContent::Text(format!(
            "No monitoring data yet. Run `{}ping` to check now.",
            self.command_prefix
        ))
    }

    /// 手動チェック中の表示
    pub fn checking(&self) -> MessageContent {
        MessageContent::Text(format!("Checking {} server...", self.target_name))
    }
}

/// バッククォートで囲み、フィールド値の上限に収める
fn inline_code(text: &str) -> String {
    format!("`{}`", truncate(text, FIELD_VALUE_LIMIT - 2))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit - 1).collect();
    out.push(ELLIPSIS);
    out
}
