//! Restaurant Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_key};
use crate::db::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "restaurant";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all restaurants (map/browse view)
    pub async fn find_all(&self) -> RepoResult<Vec<Restaurant>> {
        let restaurants: Vec<Restaurant> = self
            .base
            .db()
            .query("SELECT * FROM restaurant ORDER BY name")
            .await?
            .take(0)?;
        Ok(restaurants)
    }

    /// Find restaurant by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        let thing = parse_record_key(TABLE, id)?;
        let restaurant: Option<Restaurant> = self.base.db().select(thing).await?;
        Ok(restaurant)
    }

    /// Create a new restaurant
    pub async fn create(&self, data: RestaurantCreate) -> RepoResult<Restaurant> {
        let restaurant = Restaurant {
            id: None,
            name: data.name,
            latitude: data.latitude,
            longitude: data.longitude,
            description: data.description,
            hours_open: data.hours_open,
            phone: data.phone,
        };

        let created: Option<Restaurant> = self.base.db().create(TABLE).content(restaurant).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create restaurant".to_string()))
    }

    /// Update restaurant info (admin)
    pub async fn update(&self, id: &str, data: RestaurantUpdate) -> RepoResult<Restaurant> {
        let thing = parse_record_key(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Restaurant {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let latitude = data.latitude.unwrap_or(existing.latitude);
        let longitude = data.longitude.unwrap_or(existing.longitude);
        let description = data.description.unwrap_or(existing.description);
        let hours_open = data.hours_open.unwrap_or(existing.hours_open);
        let phone = data.phone.unwrap_or(existing.phone);

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, latitude = $latitude, longitude = $longitude, \
                 description = $description, hours_open = $hours_open, phone = $phone",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("latitude", latitude))
            .bind(("longitude", longitude))
            .bind(("description", description))
            .bind(("hours_open", hours_open))
            .bind(("phone", phone))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Restaurant {} not found", id)))
    }
}
