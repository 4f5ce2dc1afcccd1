//! Downdetector Bot
//!
//! 監視対象URLの稼働状況を定期チェックし、チャンネルに常に1件だけ最新の状態を表示する

#![warn(missing_docs)]

/// REST APIハンドラー（コマンド受付）
pub mod api;

/// チャットプラットフォーム抽象とDiscordクライアント
pub mod chat;

/// CLIインターフェース
pub mod cli;

/// コマンドハンドラー
pub mod commands;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ヘルスチェック（プローブ）
pub mod health;

/// メッセージライフサイクル管理（チャンネルごとに最新1件のみ）
pub mod lifecycle;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 起動完了シグナル
pub mod readiness;

/// ステータス表示の整形
pub mod render;

/// 定期チェックスケジューラー
pub mod scheduler;

/// 最新プローブ結果の保持
pub mod store;

use downdetector_common::config::MonitorConfig;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 監視設定
    pub config: Arc<MonitorConfig>,
    /// 最新プローブ結果
    pub store: store::StatusStore,
    /// コマンドハンドラー
    pub commands: commands::CommandHandlers,
}
