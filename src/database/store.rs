use async_trait::async_trait;
use thiserror::Error;

use crate::food::recipe::{NewRecipe, Recipe};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Remote store returned status {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// CRUD over saved recipes and favorites, scoped by user.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Newest first.
    async fn list_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DatabaseError>;

    async fn get_recipe(&self, user_id: &str, recipe_id: &str) -> Result<Option<Recipe>, DatabaseError>;

    async fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, DatabaseError>;

    /// Also drops the recipe's favorites. `false` when nothing matched.
    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError>;

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<String>, DatabaseError>;

    async fn is_favorite(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError>;

    async fn add_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError>;

    async fn remove_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError>;

    /// Flips the favorite flag and returns the new state.
    async fn toggle_favorite(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError> {
        if self.is_favorite(user_id, recipe_id).await? {
            self.remove_favorite(user_id, recipe_id).await?;
            Ok(false)
        } else {
            self.add_favorite(user_id, recipe_id).await?;
            Ok(true)
        }
    }
}
