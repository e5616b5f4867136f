//! Reservation Repository
//!
//! 创建与状态迁移由 `booking` 模块在事务内完成，这里只提供查询。

use super::{BaseRepository, RepoResult, parse_record_key};
use crate::db::models::Reservation;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "reservation";

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing = parse_record_key(TABLE, id)?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// 顾客视角：自己的全部预订，新的在前
    pub async fn find_by_customer(&self, uid: &str) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation WHERE customer_uid = $uid ORDER BY created_at DESC",
            )
            .bind(("uid", uid.to_string()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// 商家视角：本餐厅的全部预订，新的在前
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation WHERE restaurant = $restaurant \
                 ORDER BY created_at DESC",
            )
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }
}
