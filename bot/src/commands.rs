//! コマンドハンドラー
//!
//! - `ping`: 即時にプローブし、結果を保存して公開する
//! - `status`: 保存済みの最新結果を公開する（再プローブしない）

use crate::chat::MessageHandle;
use crate::health::HealthProber;
use crate::lifecycle::MessageLifecycleManager;
use crate::render::Renderer;
use crate::store::StatusStore;
use downdetector_common::error::{BotError, BotResult};
use downdetector_common::types::{ChannelId, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// ボットコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// 手動チェック
    Ping,
    /// 最新結果の表示
    Status,
}

impl Command {
    /// プレフィックス付きのテキストを解釈する
    ///
    /// プレフィックスで始まらないテキストは `Ok(None)`、
    /// プレフィックスの後が未知のコマンドならエラー。
    pub fn parse(prefix: &str, text: &str) -> BotResult<Option<Command>> {
        let Some(rest) = text.trim().strip_prefix(prefix) else {
            return Ok(None);
        };
        // コマンド名はプレフィックスの直後に続く必要がある
        if rest.starts_with(char::is_whitespace) {
            return Ok(None);
        }
        let name = rest.split_whitespace().next().unwrap_or_default();

        match name.to_ascii_lowercase().as_str() {
            "ping" => Ok(Some(Command::Ping)),
            "status" => Ok(Some(Command::Status)),
            _ => Err(BotError::UnknownCommand(rest.trim().to_string())),
        }
    }
}

/// コマンド実行結果
#[derive(Debug, Clone)]
pub struct CommandReport {
    /// 公開した結果（プレースホルダーの場合は `None`）
    pub result: Option<ProbeResult>,
    /// 公開したメッセージ
    pub message: MessageHandle,
}

/// コマンドハンドラー
#[derive(Clone)]
pub struct CommandHandlers {
    prober: HealthProber,
    store: StatusStore,
    lifecycle: MessageLifecycleManager,
    renderer: Renderer,
    target_url: String,
    probe_timeout: Duration,
}

impl CommandHandlers {
    /// 新しいハンドラーを作成
    pub fn new(
        prober: HealthProber,
        store: StatusStore,
        lifecycle: MessageLifecycleManager,
        renderer: Renderer,
        target_url: impl Into<String>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            store,
            lifecycle,
            renderer,
            target_url: target_url.into(),
            probe_timeout,
        }
    }

    /// コマンドを実行
    ///
    /// 送信先チャンネルが存在しない場合はプローブも保存もせずに
    /// `ChannelNotFound` を返す。
    pub async fn dispatch(
        &self,
        command: Command,
        channel_id: ChannelId,
    ) -> BotResult<CommandReport> {
        info!(command = ?command, channel_id = %channel_id, "Command received");
        if self.lifecycle.channel(channel_id).await?.is_none() {
            warn!(channel_id = %channel_id, "Command target channel not found");
            return Err(BotError::ChannelNotFound(channel_id));
        }

        match command {
            Command::Ping => self.manual_check(channel_id).await,
            Command::Status => self.status(channel_id).await,
        }
    }

    /// 手動チェック
    ///
    /// 「確認中」メッセージもライフサイクルマネージャー経由で公開するので、
    /// 結果の公開時に置き換えられてチャンネルに残らない。
    pub async fn manual_check(&self, channel_id: ChannelId) -> BotResult<CommandReport> {
        if let Err(e) = self
            .lifecycle
            .publish(channel_id, &self.renderer.checking())
            .await
        {
            warn!(channel_id = %channel_id, error = %e, "Failed to post checking message");
        }

        let result = self.prober.probe(&self.target_url, self.probe_timeout).await;
        self.store.write(result.clone()).await;

        let message = self
            .lifecycle
            .publish(channel_id, &self.renderer.result(&result))
            .await?;

        Ok(CommandReport {
            result: Some(result),
            message,
        })
    }

    /// 最新結果の表示
    pub async fn status(&self, channel_id: ChannelId) -> BotResult<CommandReport> {
        let latest = self.store.read().await;
        let content = match &latest {
            Some(result) => self.renderer.result(result),
            None => self.renderer.no_data(),
        };

        let message = self.lifecycle.publish(channel_id, &content).await?;
        Ok(CommandReport {
            result: latest,
            message,
        })
    }
}
