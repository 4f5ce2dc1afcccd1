//! インメモリのチャットプラットフォーム
//!
//! 送信したメッセージをプロセス内に保持する。`serve --dry-run` とテストで使用。

use super::{Channel, ChatPlatform, MessageContent, MessageHandle};
use async_trait::async_trait;
use downdetector_common::error::ChatError;
use downdetector_common::types::{ChannelId, MessageId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Default)]
struct Inner {
    channels: HashSet<ChannelId>,
    live: BTreeMap<MessageId, (ChannelId, MessageContent)>,
    next_id: u64,
    sent: Vec<(ChannelId, MessageContent)>,
    delete_calls: usize,
    max_live: HashMap<ChannelId, usize>,
    fail_sends: bool,
    fail_deletes: bool,
}

impl Inner {
    fn live_count(&self, channel_id: ChannelId) -> usize {
        self.live.values().filter(|(c, _)| *c == channel_id).count()
    }
}

/// インメモリプラットフォーム
#[derive(Clone, Default)]
pub struct InMemoryPlatform {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryPlatform {
    /// 空のプラットフォームを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンネルを登録済みの状態で作成
    pub fn with_channel(channel_id: ChannelId) -> Self {
        let mut inner = Inner::default();
        inner.channels.insert(channel_id);
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// チャンネルを追加
    pub async fn add_channel(&self, channel_id: ChannelId) {
        self.inner.lock().await.channels.insert(channel_id);
    }

    /// チャンネルを削除（メッセージも消える）
    pub async fn remove_channel(&self, channel_id: ChannelId) {
        let mut inner = self.inner.lock().await;
        inner.channels.remove(&channel_id);
        inner.live.retain(|_, (c, _)| *c != channel_id);
    }

    /// 送信を失敗させるかどうか
    pub async fn set_fail_sends(&self, fail: bool) {
        self.inner.lock().await.fail_sends = fail;
    }

    /// 削除を失敗させるかどうか（NotFound以外のエラー）
    pub async fn set_fail_deletes(&self, fail: bool) {
        self.inner.lock().await.fail_deletes = fail;
    }

    /// 外部からメッセージが削除されたことにする
    pub async fn remove_externally(&self, handle: &MessageHandle) {
        self.inner.lock().await.live.remove(&handle.message_id);
    }

    /// チャンネルに残っているメッセージ（古い順）
    pub async fn live_messages(&self, channel_id: ChannelId) -> Vec<MessageContent> {
        self.inner
            .lock()
            .await
            .live
            .values()
            .filter(|(c, _)| *c == channel_id)
            .map(|(_, content)| content.clone())
            .collect()
    }

    /// 送信したすべてのメッセージ（削除済みを含む）
    pub async fn sent_messages(&self) -> Vec<(ChannelId, MessageContent)> {
        self.inner.lock().await.sent.clone()
    }

    /// 削除の呼び出し回数
    pub async fn delete_calls(&self) -> usize {
        self.inner.lock().await.delete_calls
    }

    /// チャンネル内で同時に存在したメッセージ数の最大値
    pub async fn max_live(&self, channel_id: ChannelId) -> usize {
        self.inner
            .lock()
            .await
            .max_live
            .get(&channel_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChatPlatform for InMemoryPlatform {
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageHandle, ChatError> {
        // 他タスクが割り込める余地を作る
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().await;
        if inner.fail_sends {
            return Err(ChatError::Http("simulated send failure".to_string()));
        }
        if !inner.channels.contains(&channel_id) {
            return Err(ChatError::Api {
                status: 404,
                message: "Unknown Channel".to_string(),
            });
        }

        inner.next_id += 1;
        let message_id = MessageId(inner.next_id);
        inner.live.insert(message_id, (channel_id, content.clone()));
        inner.sent.push((channel_id, content.clone()));

        let live = inner.live_count(channel_id);
        let max = inner.max_live.entry(channel_id).or_insert(0);
        *max = (*max).max(live);

        info!(
            channel_id = %channel_id,
            message_id = %message_id,
            content = %content.summary(),
            "Message stored in memory"
        );

        Ok(MessageHandle {
            channel_id,
            message_id,
        })
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChatError> {
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().await;
        inner.delete_calls += 1;
        if inner.fail_deletes {
            return Err(ChatError::Api {
                status: 500,
                message: "simulated delete failure".to_string(),
            });
        }
        match inner.live.remove(&handle.message_id) {
            Some(_) => Ok(()),
            None => Err(ChatError::MessageNotFound),
        }
    }

    async fn get_channel(&self, channel_id: ChannelId) -> Result<Option<Channel>, ChatError> {
        let inner = self.inner.lock().await;
        Ok(inner.channels.contains(&channel_id).then(|| Channel {
            id: channel_id,
            name: None,
        }))
    }
}
