//! 起動完了シグナル
//!
//! プラットフォームへのログインが完了し、チャンネル操作が可能になったことを通知する。
//! 一度立てたフラグは戻らない。

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// One-shot readiness flag shared between the login step and the scheduler.
#[derive(Clone, Debug, Default)]
pub struct Readiness {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    ready: AtomicBool,
    notify: Notify,
}

impl Readiness {
    /// 未完了状態で作成
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the host has signalled readiness.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Mark as ready and wake all waiters. Repeated calls are no-ops.
    pub fn mark_ready(&self) {
        if !self.inner.ready.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait until readiness is signalled.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // 登録してからフラグを確認しないと通知を取りこぼす
            notified.as_mut().enable();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }
}
