//! 定期チェックスケジューラー
//!
//! 起動完了シグナルを待ってから、一定間隔でプローブと公開を行う。
//! 状態が前回と同じでも毎回公開する。
//!
//! ティックは1つのタスク内で順番に実行するため、前回の公開が終わる前に次のティックが
//! 来た場合は待たされる（捨てない）。手動コマンドとの競合はライフサイクルマネージャーの
//! チャンネル単位ロックで直列化される。

use crate::chat::{ChatPlatform, MessageHandle};
use crate::health::HealthProber;
use crate::lifecycle::MessageLifecycleManager;
use crate::readiness::Readiness;
use crate::render::Renderer;
use crate::store::StatusStore;
use downdetector_common::config::MonitorConfig;
use downdetector_common::types::ChannelId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 1回のティックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 結果を公開した
    Published(MessageHandle),
    /// 結果の保存のみ（チャンネル未設定・取得不可）
    StoreOnly,
    /// 保存はしたが送信に失敗した
    SendFailed,
}

/// スケジューラー
#[derive(Clone)]
pub struct Scheduler {
    prober: HealthProber,
    store: StatusStore,
    lifecycle: MessageLifecycleManager,
    platform: Arc<dyn ChatPlatform>,
    renderer: Renderer,
    readiness: Readiness,
    target_url: String,
    channel_id: Option<ChannelId>,
    probe_timeout: Duration,
    interval: Duration,
    channel_missing: Arc<AtomicBool>,
}

impl Scheduler {
    /// 設定から新しいスケジューラーを作成
    pub fn new(
        config: &MonitorConfig,
        prober: HealthProber,
        store: StatusStore,
        lifecycle: MessageLifecycleManager,
        platform: Arc<dyn ChatPlatform>,
        readiness: Readiness,
    ) -> Self {
        Self {
            prober,
            store,
            lifecycle,
            platform,
            renderer: Renderer::from_config(config),
            readiness,
            target_url: config.target_url.clone(),
            channel_id: config.channel_id,
            probe_timeout: config.probe_timeout(),
            interval: config.poll_interval(),
            channel_missing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 監視チャンネルが見つからない状態かどうか
    pub fn is_channel_missing(&self) -> bool {
        self.channel_missing.load(Ordering::Relaxed)
    }

    /// バックグラウンドで監視を開始
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// 監視ループ
    pub async fn run(&self) {
        if !self.readiness.is_ready() {
            debug!("Scheduler waiting for readiness signal");
        }
        self.readiness.wait().await;

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.interval.as_secs(),
            target_url = %self.target_url,
            channel_id = ?self.channel_id,
            "Status scheduler started"
        );
        if self.channel_id.is_none() {
            warn!("No monitored channel configured; results will only be recorded");
        }

        // 最初のティックは即時
        loop {
            timer.tick().await;
            let outcome = self.tick().await;
            debug!(outcome = ?outcome, "Scheduled check completed");
        }
    }

    /// プローブして保存し、監視チャンネルに公開する
    pub async fn tick(&self) -> TickOutcome {
        let result = self.prober.probe(&self.target_url, self.probe_timeout).await;
        self.store.write(result.clone()).await;

        let Some(channel_id) = self.channel_id else {
            return TickOutcome::StoreOnly;
        };

        match self.platform.get_channel(channel_id).await {
            Ok(Some(_)) => {
                if self.channel_missing.swap(false, Ordering::Relaxed) {
                    info!(channel_id = %channel_id, "Monitored channel is available again");
                }
            }
            Ok(None) => {
                if !self.channel_missing.swap(true, Ordering::Relaxed) {
                    error!(
                        channel_id = %channel_id,
                        "Monitored channel not found; recording results only"
                    );
                }
                return TickOutcome::StoreOnly;
            }
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Failed to look up monitored channel");
                return TickOutcome::StoreOnly;
            }
        }

        match self
            .lifecycle
            .publish(channel_id, &self.renderer.result(&result))
            .await
        {
            Ok(handle) => TickOutcome::Published(handle),
            Err(_) => TickOutcome::SendFailed,
        }
    }
}
