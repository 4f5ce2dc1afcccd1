//! ヘルスプローバー
//!
//! GETリクエストを1回送信し、応答ヘッダーの受信までを計測する。
//! 結果はすべて `ProbeResult` として返し、エラーとして外に出さない。

use downdetector_common::error::{BotError, BotResult};
use downdetector_common::types::{ProbeOutcome, ProbeResult};
use reqwest::Client;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// プローブ時のUser-Agent
const USER_AGENT: &str = concat!("downdetector-bot/", env!("CARGO_PKG_VERSION"));

/// ヘルスプローバー
#[derive(Clone)]
pub struct HealthProber {
    /// HTTPクライアント（接続プーリング有効）
    client: Client,
}

impl HealthProber {
    /// 新しいプローバーを作成
    pub fn new() -> BotResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BotError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// 1回だけプローブし、結果を分類する
    pub async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult {
        let outcome = self.observe(url, timeout).await;
        let result = ProbeResult::classify(outcome);

        if result.is_online() {
            debug!(
                url = %url,
                status_code = ?result.status_code,
                latency_ms = ?result.response_time_ms,
                "Probe succeeded"
            );
        } else {
            warn!(
                url = %url,
                status = %result.status,
                status_code = ?result.status_code,
                error = ?result.error_message,
                "Probe failed"
            );
        }

        result
    }

    async fn observe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();

        match tokio::time::timeout(timeout, self.client.get(url).send()).await {
            Err(_) => ProbeOutcome::TransportTimeout,
            Ok(Ok(response)) => {
                let elapsed = start.elapsed();
                let status_code = response.status().as_u16();
                if status_code == 200 {
                    ProbeOutcome::UpstreamOk {
                        status_code,
                        elapsed,
                    }
                } else {
                    ProbeOutcome::UpstreamNonOk {
                        status_code,
                        elapsed,
                    }
                }
            }
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::TransportTimeout,
            Ok(Err(e)) => ProbeOutcome::TransportError(describe_error(&e)),
        }
    }
}

/// エラーの原因チェーンを1行にまとめる
///
/// reqwestのトップレベルのメッセージは「error sending request」程度なので、
/// 接続拒否やDNS失敗などの原因まで辿って連結する。
fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);

    while let Some(e) = current {
        let message = e.to_string();
        if !message.is_empty() && !parts.iter().any(|p| p.contains(&message)) {
            parts.push(message);
        }
        current = e.source();
    }

    parts.join(": ")
}
