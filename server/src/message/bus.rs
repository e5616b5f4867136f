//! 同步总线
//!
//! tokio broadcast 通道 + 每资源单调递增版本号。
//! 没有订阅者时发送会失败，这不是错误（服务端不要求有在线客户端）。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;

use shared::{SyncAction, SyncPayload};

/// 资源变更同步总线
#[derive(Clone)]
pub struct SyncBus {
    sender: broadcast::Sender<SyncPayload>,
    /// 每资源版本号，订阅方用于丢弃乱序/重复通知
    versions: Arc<DashMap<String, AtomicU64>>,
}

impl SyncBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            versions: Arc::new(DashMap::new()),
        }
    }

    /// 订阅全部资源变更
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.sender.subscribe()
    }

    /// 当前订阅者数量
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// 广播一次资源变更
    ///
    /// 版本号按资源递增；`data` 在删除时为 None。
    /// 序列化失败只记日志，不中断写入路径。
    pub fn publish<T: Serialize>(
        &self,
        resource: &str,
        action: SyncAction,
        id: &str,
        data: Option<&T>,
    ) {
        let data = match data {
            Some(value) => match serde_json::to_value(value) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(resource, id, error = %e, "Failed to serialize sync payload");
                    return;
                }
            },
            None => None,
        };

        let version = self
            .versions
            .entry(resource.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::SeqCst)
            + 1;

        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action,
            id: id.to_string(),
            data,
        };

        if self.sender.send(payload).is_err() {
            tracing::trace!(resource, id, "No sync subscribers");
        }
    }

    /// 某资源的当前版本号
    pub fn current_version(&self, resource: &str) -> u64 {
        self.versions
            .get(resource)
            .map(|v| v.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_increments_version_per_resource() {
        let bus = SyncBus::with_capacity(16);
        let mut rx = bus.subscribe();

        bus.publish("time_slot", SyncAction::Updated, "a", Some(&1));
        bus.publish("time_slot", SyncAction::Updated, "b", Some(&2));
        bus.publish("reservation", SyncAction::Created, "c", Some(&3));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.resource, "time_slot");
        assert_eq!(first.version, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.version, 2);
        let third = rx.recv().await.unwrap();
        assert_eq!(third.resource, "reservation");
        assert_eq!(third.version, 1);

        assert_eq!(bus.current_version("time_slot"), 2);
        assert_eq!(bus.current_version("menu_item"), 0);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = SyncBus::with_capacity(16);
        bus.publish::<serde_json::Value>("reservation", SyncAction::Deleted, "gone", None);
        assert_eq!(bus.current_version("reservation"), 1);
    }
}
