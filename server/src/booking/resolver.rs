//! Availability Resolver
//!
//! 给定餐厅和日期，解析哪些时段可以接受新预订。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::{SlotStatus, TimeSlot};
use crate::db::repository::TimeSlotRepository;
use crate::utils::time::label_minutes;

use super::BookingError;

/// 时段可用性解析器
#[derive(Clone)]
pub struct AvailabilityResolver {
    slots: TimeSlotRepository,
}

impl AvailabilityResolver {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            slots: TimeSlotRepository::new(db),
        }
    }

    /// 列出某餐厅某日的全部时段，按标签时刻升序
    ///
    /// 存储层不保证顺序，这里按 "HH:MM" 解析出的当日时刻排序；
    /// 无法解析的标签排在末尾，按字典序兜底。
    /// 从未播种的日期分区返回空列表，不视为错误。
    pub async fn list_slots(
        &self,
        restaurant: &RecordId,
        date: &str,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        let mut slots = self.slots.find_partition(restaurant, date).await?;
        slots.sort_by(|a, b| {
            let ka = (label_minutes(&a.label).unwrap_or(u32::MAX), a.label.clone());
            let kb = (label_minutes(&b.label).unwrap_or(u32::MAX), b.label.clone());
            ka.cmp(&kb)
        });
        Ok(slots)
    }

    /// 查询单个时段的可用性和容量
    ///
    /// 时段不存在时返回 [`BookingError::SlotNotFound`]。
    pub async fn check_slot(
        &self,
        restaurant: &RecordId,
        date: &str,
        label: &str,
    ) -> Result<SlotStatus, BookingError> {
        let slot = self
            .slots
            .find_slot(restaurant, date, label)
            .await?
            .ok_or_else(|| BookingError::SlotNotFound {
                date: date.to_string(),
                label: label.to_string(),
            })?;

        Ok(SlotStatus {
            available: slot.available,
            capacity: slot.capacity,
        })
    }
}
