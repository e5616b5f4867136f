//! Time Slot Repository
//!
//! 时段分区按 (restaurant, date) 组织；同一分区内 label 唯一。
//! 下单时对时段的占用由 `booking::writer` 在事务内完成，
//! 这里只提供查询、管理端播种和过期释放。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::TimeSlot;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "time_slot";

#[derive(Clone)]
pub struct TimeSlotRepository {
    base: BaseRepository,
}

impl TimeSlotRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 查询某餐厅某日的全部时段 (未排序，排序由 resolver 负责)
    pub async fn find_partition(
        &self,
        restaurant: &RecordId,
        date: &str,
    ) -> RepoResult<Vec<TimeSlot>> {
        let slots: Vec<TimeSlot> = self
            .base
            .db()
            .query("SELECT * FROM time_slot WHERE restaurant = $restaurant AND date = $date")
            .bind(("restaurant", restaurant.clone()))
            .bind(("date", date.to_string()))
            .await?
            .take(0)?;
        Ok(slots)
    }

    /// 查询单个时段
    pub async fn find_slot(
        &self,
        restaurant: &RecordId,
        date: &str,
        label: &str,
    ) -> RepoResult<Option<TimeSlot>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM time_slot WHERE restaurant = $restaurant AND date = $date \
                 AND label = $label LIMIT 1",
            )
            .bind(("restaurant", restaurant.clone()))
            .bind(("date", date.to_string()))
            .bind(("label", label.to_string()))
            .await?;
        let slots: Vec<TimeSlot> = result.take(0)?;
        Ok(slots.into_iter().next())
    }

    /// 播种或覆盖时段 (管理端)
    ///
    /// 设为可用时清除遗留的占用到期时间。
    pub async fn upsert(
        &self,
        restaurant: RecordId,
        date: &str,
        label: &str,
        available: bool,
        capacity: i64,
    ) -> RepoResult<TimeSlot> {
        if let Some(existing) = self.find_slot(&restaurant, date, label).await? {
            let thing = existing
                .id
                .clone()
                .ok_or_else(|| RepoError::Database("Slot record missing id".to_string()))?;
            let (booking_end_time, held_by) = if available {
                (None, None)
            } else {
                (existing.booking_end_time, existing.held_by)
            };
            self.base
                .db()
                .query(
                    "UPDATE $thing SET available = $available, capacity = $capacity, \
                     booking_end_time = $booking_end_time, held_by = $held_by",
                )
                .bind(("thing", thing))
                .bind(("available", available))
                .bind(("capacity", capacity))
                .bind(("booking_end_time", booking_end_time))
                .bind(("held_by", held_by))
                .await?;
            return self
                .find_slot(&restaurant, date, label)
                .await?
                .ok_or_else(|| RepoError::Database("Slot disappeared during upsert".to_string()));
        }

        // CREATE 语句绑定原生 RecordId，避免 restaurant 被序列化为字符串
        // (字符串和记录链接在 WHERE restaurant = $restaurant 下不相等)
        let created: Vec<TimeSlot> = self
            .base
            .db()
            .query(
                "CREATE time_slot CONTENT { restaurant: $restaurant, date: $date, \
                 label: $label, available: $available, capacity: $capacity } RETURN AFTER",
            )
            .bind(("restaurant", restaurant))
            .bind(("date", date.to_string()))
            .bind(("label", label.to_string()))
            .bind(("available", available))
            .bind(("capacity", capacity))
            .await?
            .take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create time slot".to_string()))
    }

    /// 释放所有占用已到期的时段，返回被释放的时段
    ///
    /// 释放条件: `booking_end_time <= now`。
    pub async fn release_expired(&self, now_millis: i64) -> RepoResult<Vec<TimeSlot>> {
        let released: Vec<TimeSlot> = self
            .base
            .db()
            .query(
                "UPDATE time_slot SET available = true, booking_end_time = NONE, \
                 held_by = NONE \
                 WHERE available = false AND booking_end_time != NONE \
                 AND booking_end_time <= $now RETURN AFTER",
            )
            .bind(("now", now_millis))
            .await?
            .take(0)?;
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    // 播种的时段必须能被 RecordId 绑定的查询命中，
    // 即 restaurant 字段要以记录链接而不是字符串落库
    #[tokio::test]
    async fn seeded_slot_is_visible_to_record_id_queries() {
        let db = DbService::memory().await.unwrap().db;
        let repo = TimeSlotRepository::new(db);
        let r1 = RecordId::from(("restaurant", "r1"));

        let created = repo
            .upsert(r1.clone(), "01-06-2024", "18:00", true, 4)
            .await
            .unwrap();
        assert_eq!(created.restaurant, r1);

        let found = repo.find_slot(&r1, "01-06-2024", "18:00").await.unwrap();
        assert!(found.is_some(), "seeded slot invisible to bound query");

        let partition = repo.find_partition(&r1, "01-06-2024").await.unwrap();
        assert_eq!(partition.len(), 1);
    }

    #[tokio::test]
    async fn upsert_to_available_clears_hold() {
        let db = DbService::memory().await.unwrap().db;
        let repo = TimeSlotRepository::new(db.clone());
        let r1 = RecordId::from(("restaurant", "r1"));
        repo.upsert(r1.clone(), "01-06-2024", "18:00", true, 4)
            .await
            .unwrap();
        db.query(
            "UPDATE time_slot SET available = false, booking_end_time = 1, \
             held_by = type::thing('reservation', 'x') WHERE label = '18:00'",
        )
        .await
        .unwrap();

        let slot = repo
            .upsert(r1.clone(), "01-06-2024", "18:00", true, 6)
            .await
            .unwrap();
        assert!(slot.available);
        assert_eq!(slot.capacity, 6);
        assert_eq!(slot.booking_end_time, None);
        assert_eq!(slot.held_by, None);
    }
}
