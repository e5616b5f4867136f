//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

pub mod menu_item;
pub mod reservation;
pub mod restaurant;
pub mod time_slot;
pub mod user;

// Re-exports
pub use menu_item::MenuItemRepository;
pub use reservation::ReservationRepository;
pub use restaurant::RestaurantRepository;
pub use time_slot::TimeSlotRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: API 中统一使用 "table:id" 格式，路径参数允许省略表前缀
// =============================================================================

/// 解析资源 ID
///
/// 接受两种格式：
/// - "table:key" 全称 (校验表名)
/// - 裸 key (补上表名)
pub fn parse_record_key(table: &str, id: &str) -> RepoResult<RecordId> {
    if id.contains(':') {
        let record: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        if record.table() != table {
            return Err(RepoError::Validation(format!(
                "Expected {} ID, got: {}",
                table, id
            )));
        }
        Ok(record)
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_key_accepts_both_forms() {
        let full = parse_record_key("restaurant", "restaurant:r1").unwrap();
        let bare = parse_record_key("restaurant", "r1").unwrap();
        assert_eq!(full, bare);
    }

    #[test]
    fn parse_record_key_rejects_wrong_table() {
        assert!(parse_record_key("restaurant", "user:u1").is_err());
    }
}
