//! メッセージライフサイクル管理
//!
//! チャンネルごとに「生きている」メッセージを最大1件に保つ。
//! 公開のたびに前回のメッセージを削除してから新しいメッセージを送信する（編集はしない）。
//!
//! 同一チャンネルへの公開はチャンネル単位のロックで直列化する。
//! 削除・送信・記録の間ずっとロックを保持するため、定期チェックと手動コマンドが
//! 同時に走っても同じハンドルを二重に削除したり、2件同時に残したりしない。

use crate::chat::{Channel, ChatPlatform, MessageContent, MessageHandle};
use downdetector_common::error::ChatError;
use downdetector_common::types::ChannelId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

type Slot = Arc<Mutex<Option<MessageHandle>>>;

/// メッセージライフサイクルマネージャー
#[derive(Clone)]
pub struct MessageLifecycleManager {
    platform: Arc<dyn ChatPlatform>,
    slots: Arc<Mutex<HashMap<ChannelId, Slot>>>,
}

impl MessageLifecycleManager {
    /// 新しいマネージャーを作成
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self {
            platform,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 前回のメッセージを置き換えて公開する
    ///
    /// 前回メッセージの削除失敗は処理を止めない。送信に失敗した場合は
    /// 現在のハンドルを空にしてエラーを返す（次回の公開まで生きたメッセージはない）。
    pub async fn publish(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageHandle, ChatError> {
        let slot = self.slot(channel_id).await;
        let mut current = slot.lock().await;

        if let Some(previous) = current.take() {
            match self.platform.delete(&previous).await {
                Ok(()) => {
                    debug!(
                        channel_id = %channel_id,
                        message_id = %previous.message_id,
                        "Previous status message deleted"
                    );
                }
                Err(ChatError::MessageNotFound) => {
                    debug!(
                        channel_id = %channel_id,
                        message_id = %previous.message_id,
                        "Previous status message already gone"
                    );
                }
                Err(e) => {
                    warn!(
                        channel_id = %channel_id,
                        message_id = %previous.message_id,
                        error = %e,
                        "Failed to delete previous status message"
                    );
                }
            }
        }

        match self.platform.send(channel_id, content).await {
            Ok(handle) => {
                debug!(
                    channel_id = %channel_id,
                    message_id = %handle.message_id,
                    "Status message published"
                );
                *current = Some(handle);
                Ok(handle)
            }
            Err(e) => {
                error!(
                    channel_id = %channel_id,
                    error = %e,
                    "Failed to send status message"
                );
                drop(current);
                self.release_idle_slot(channel_id, slot).await;
                Err(e)
            }
        }
    }

    /// 送信先チャンネルを取得する（存在しなければ `None`）
    pub async fn channel(&self, channel_id: ChannelId) -> Result<Option<Channel>, ChatError> {
        self.platform.get_channel(channel_id).await
    }

    /// チャンネルの現在のメッセージ
    pub async fn current(&self, channel_id: ChannelId) -> Option<MessageHandle> {
        let slot = self.slots.lock().await.get(&channel_id).cloned()?;
        let current = slot.lock().await;
        *current
    }

    async fn slot(&self, channel_id: ChannelId) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(channel_id).or_default().clone()
    }

    /// 誰も使っておらずハンドルも持たないスロットをマップから外す
    ///
    /// 参照がマップとこの呼び出しの2つだけなら、マップのロック中に他から
    /// 取得されることはない。
    async fn release_idle_slot(&self, channel_id: ChannelId, slot: Slot) {
        let mut slots = self.slots.lock().await;
        let registered = slots
            .get(&channel_id)
            .is_some_and(|s| Arc::ptr_eq(s, &slot));
        let idle = Arc::strong_count(&slot) == 2
            && slot.try_lock().map(|c| c.is_none()).unwrap_or(false);
        if registered && idle {
            slots.remove(&channel_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::InMemoryPlatform;

    const CHANNEL: ChannelId = ChannelId(12345678910);

    fn text(s: &str) -> MessageContent {
        MessageContent::Text(s.to_string())
    }

    fn setup() -> (InMemoryPlatform, MessageLifecycleManager) {
        let platform = InMemoryPlatform::with_channel(CHANNEL);
        let manager = MessageLifecycleManager::new(Arc::new(platform.clone()));
        (platform, manager)
    }

    #[tokio::test]
    async fn test_publish_replaces_previous_message() {
        let (platform, manager) = setup();

        manager.publish(CHANNEL, &text("A")).await.unwrap();
        let handle = manager.publish(CHANNEL, &text("B")).await.unwrap();

        assert_eq!(platform.live_messages(CHANNEL).await, vec![text("B")]);
        assert_eq!(manager.current(CHANNEL).await, Some(handle));
    }

    #[tokio::test]
    async fn test_first_publish_does_not_delete() {
        let (platform, manager) = setup();

        manager.publish(CHANNEL, &text("A")).await.unwrap();

        assert_eq!(platform.delete_calls().await, 0);
    }

    #[tokio::test]
    async fn test_already_deleted_message_is_ignored() {
        let (platform, manager) = setup();

        let first = manager.publish(CHANNEL, &text("A")).await.unwrap();
        platform.remove_externally(&first).await;

        manager.publish(CHANNEL, &text("B")).await.unwrap();
        assert_eq!(platform.live_messages(CHANNEL).await, vec![text("B")]);
    }

    #[tokio::test]
    async fn test_delete_failure_does_not_abort_publish() {
        let (platform, manager) = setup();

        manager.publish(CHANNEL, &text("A")).await.unwrap();
        platform.set_fail_deletes(true).await;

        let handle = manager.publish(CHANNEL, &text("B")).await.unwrap();
        assert_eq!(manager.current(CHANNEL).await, Some(handle));
        assert_eq!(platform.sent_messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_send_failure_clears_current_handle() {
        let (platform, manager) = setup();

        manager.publish(CHANNEL, &text("A")).await.unwrap();
        platform.set_fail_sends(true).await;

        assert!(manager.publish(CHANNEL, &text("B")).await.is_err());
        assert_eq!(manager.current(CHANNEL).await, None);
        assert!(platform.live_messages(CHANNEL).await.is_empty());

        // 次の公開で復旧し、余計な削除は行わない
        platform.set_fail_sends(false).await;
        let deletes_before = platform.delete_calls().await;
        manager.publish(CHANNEL, &text("C")).await.unwrap();
        assert_eq!(platform.delete_calls().await, deletes_before);
        assert_eq!(platform.live_messages(CHANNEL).await, vec![text("C")]);
    }

    #[tokio::test]
    async fn test_failed_send_to_unknown_channel_leaves_no_slot() {
        let (_platform, manager) = setup();

        for id in 1000..1010 {
            assert!(manager.publish(ChannelId(id), &text("A")).await.is_err());
        }
        manager.publish(CHANNEL, &text("B")).await.unwrap();

        let slots = manager.slots.lock().await;
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key(&CHANNEL));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_slot_lookup_consistent() {
        let (platform, manager) = setup();

        manager.publish(CHANNEL, &text("A")).await.unwrap();
        platform.set_fail_sends(true).await;
        assert!(manager.publish(CHANNEL, &text("B")).await.is_err());
        assert!(manager.slots.lock().await.is_empty());

        platform.set_fail_sends(false).await;
        let handle = manager.publish(CHANNEL, &text("C")).await.unwrap();
        assert_eq!(manager.current(CHANNEL).await, Some(handle));
    }

    #[tokio::test]
    async fn test_channel_lookup() {
        let (platform, manager) = setup();

        assert!(manager.channel(CHANNEL).await.unwrap().is_some());
        platform.remove_channel(CHANNEL).await;
        assert!(manager.channel(CHANNEL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let other = ChannelId(42);
        let (platform, manager) = setup();
        platform.add_channel(other).await;

        manager.publish(CHANNEL, &text("A")).await.unwrap();
        manager.publish(other, &text("X")).await.unwrap();
        manager.publish(CHANNEL, &text("B")).await.unwrap();

        assert_eq!(platform.live_messages(CHANNEL).await, vec![text("B")]);
        assert_eq!(platform.live_messages(other).await, vec![text("X")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishes_never_leave_two_live_messages() {
        let (platform, manager) = setup();

        let mut handles = Vec::new();
        for i in 0..32 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager
                    .publish(CHANNEL, &MessageContent::Text(format!("tick {}", i)))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(platform.live_messages(CHANNEL).await.len(), 1);
        assert_eq!(platform.max_live(CHANNEL).await, 1);
        // 前回ハンドルを二重に削除していない
        assert_eq!(platform.delete_calls().await, 31);
    }
}
