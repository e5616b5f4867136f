//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_key};
use crate::db::models::{User, UserCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_key(TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email (login)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User with email '{}' already exists",
                data.email
            )));
        }

        // CREATE 语句绑定原生 RecordId，管理员的 restaurant 以记录链接落库
        let created: Vec<User> = self
            .base
            .db()
            .query(
                "CREATE user CONTENT { username: $username, email: $email, \
                 password_hash: $password_hash, role: $role, restaurant: $restaurant } \
                 RETURN AFTER",
            )
            .bind(("username", data.username))
            .bind(("email", data.email))
            .bind(("password_hash", data.password_hash))
            .bind(("role", data.role))
            .bind(("restaurant", data.restaurant))
            .await?
            .take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }
}
