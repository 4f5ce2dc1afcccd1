//! コマンド受付API

use super::AppError;
use crate::commands::Command;
use crate::AppState;
use axum::{extract::State, Json};
use downdetector_common::error::BotError;
use downdetector_common::types::{ChannelId, MessageId, ProbeResult};
use serde::{Deserialize, Serialize};

/// POST /api/commands のリクエスト
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// コマンドテキスト（例: "!aur:ping"）
    pub content: String,
    /// 送信先チャンネル（省略時は監視チャンネル）
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

/// POST /api/commands のレスポンス
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// 実行したコマンド
    pub command: Command,
    /// 公開した結果（プレースホルダーの場合は `null`）
    pub result: Option<ProbeResult>,
    /// 送信先チャンネル
    pub channel_id: ChannelId,
    /// 公開したメッセージ
    pub message_id: MessageId,
}

/// POST /api/commands - コマンド実行
pub async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let command = Command::parse(&state.config.command_prefix, &req.content)?
        .ok_or_else(|| BotError::UnknownCommand(req.content.trim().to_string()))?;
    let channel_id = req
        .channel_id
        .or(state.config.channel_id)
        .ok_or(BotError::NoChannel)?;

    let report = state.commands.dispatch(command, channel_id).await?;

    Ok(Json(CommandResponse {
        command,
        result: report.result,
        channel_id: report.message.channel_id,
        message_id: report.message.message_id,
    }))
}
