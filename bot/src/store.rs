//! 最新プローブ結果の保持
//!
//! 結果は丸ごと差し替えるため、読み手が2つのプローブ結果の混ざった状態を見ることはない。

use downdetector_common::types::ProbeResult;
use std::sync::Arc;
use tokio::sync::RwLock;

/// ステータスストア
///
/// プロセス起動時は空。永続化はしない。
#[derive(Clone, Default)]
pub struct StatusStore {
    latest: Arc<RwLock<Option<ProbeResult>>>,
}

impl StatusStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 最新結果を書き込む（後勝ち）
    pub async fn write(&self, result: ProbeResult) {
        let mut latest = self.latest.write().await;
        *latest = Some(result);
    }

    /// 最新結果を取得
    pub async fn read(&self) -> Option<ProbeResult> {
        self.latest.read().await.clone()
    }
}
