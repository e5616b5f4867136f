//! 过期时段回收服务
//!
//! 预订占用时段时写入 `booking_end_time`，本服务按固定间隔把
//! `booking_end_time <= now` 的时段放回可用池。用 `<=` 做区间比较，
//! 即使某个周期被跳过（进程重启、任务延迟），过期时段也会在下一轮
//! 被回收。

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use shared::SyncAction;

use crate::db::models::TimeSlot;
use crate::db::repository::{RepoResult, TimeSlotRepository};
use crate::message::SyncBus;
use crate::utils::time::now_millis;

/// 时段回收服务
#[derive(Clone)]
pub struct SweepService {
    slots: TimeSlotRepository,
    sync_bus: SyncBus,
    interval: Duration,
}

impl SweepService {
    pub fn new(db: Surreal<Db>, sync_bus: SyncBus, interval: Duration) -> Self {
        Self {
            slots: TimeSlotRepository::new(db),
            sync_bus,
            interval,
        }
    }

    /// 周期运行，直到收到关闭信号
    ///
    /// 启动时先跑一轮，补上进程停机期间积累的过期时段。
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Slot sweep started");

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once(now_millis()).await {
                        tracing::error!(error = %e, "Slot sweep failed");
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Slot sweep stopped");
                    break;
                }
            }
        }
    }

    /// 单轮回收：释放全部过期时段并广播变更
    pub async fn sweep_once(&self, now: i64) -> RepoResult<Vec<TimeSlot>> {
        let released = self.slots.release_expired(now).await?;

        if !released.is_empty() {
            tracing::info!(count = released.len(), "Released expired time slots");
            for slot in &released {
                let id = slot
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                self.sync_bus
                    .publish("time_slot", SyncAction::Updated, &id, Some(slot));
            }
        }

        Ok(released)
    }
}
