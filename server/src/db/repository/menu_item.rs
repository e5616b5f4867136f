//! Menu Item Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_key};
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "menu_item";

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all menu items of a restaurant
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu_item WHERE restaurant = $restaurant ORDER BY name")
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find menu item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let thing = parse_record_key(TABLE, id)?;
        let item: Option<MenuItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Create a new menu item under a restaurant
    ///
    /// CREATE 语句绑定原生 RecordId，保证 restaurant 以记录链接落库，
    /// 能被 `find_by_restaurant` 的绑定查询命中。
    pub async fn create(&self, restaurant: RecordId, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let created: Vec<MenuItem> = self
            .base
            .db()
            .query(
                "CREATE menu_item CONTENT { restaurant: $restaurant, name: $name, \
                 description: $description, price: $price } RETURN AFTER",
            )
            .bind(("restaurant", restaurant))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("price", data.price))
            .await?
            .take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    /// Update a menu item
    pub async fn update(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let thing = parse_record_key(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let description = data.description.unwrap_or(existing.description);
        let price = data.price.unwrap_or(existing.price);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, description = $description, price = $price")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("price", price))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))
    }

    /// Hard delete a menu item
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_key(TABLE, id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use rust_decimal::Decimal;

    // restaurant 必须以记录链接落库，否则绑定 RecordId 的列表查询命不中
    #[tokio::test]
    async fn created_item_is_listed_for_its_restaurant() {
        let db = DbService::memory().await.unwrap().db;
        let repo = MenuItemRepository::new(db);
        let r1 = RecordId::from(("restaurant", "r1"));

        repo.create(
            r1.clone(),
            MenuItemCreate {
                name: "Tajarin".to_string(),
                description: "Egg pasta with butter".to_string(),
                price: Decimal::new(1450, 2),
            },
        )
        .await
        .unwrap();

        let items = repo.find_by_restaurant(&r1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].restaurant, r1);
    }
}
