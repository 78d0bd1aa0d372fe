use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use log::info;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use serde_json::{json, Value};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::store::{DatabaseError, RecipeStore};
use crate::food::recipe::{NewRecipe, Recipe};

const RECIPE_COLUMNS: &str = "id, user_id, name, type, difficulty, ingredients, instructions, prep_time, \
     calories, servings, tags, nutrition_info, images, detected_ingredients, created_at";

/// Local SQLite recipe store. List-valued columns hold JSON text.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

struct RecipeRow {
    id: String,
    user_id: String,
    name: String,
    category: String,
    difficulty: Option<String>,
    ingredients: String,
    instructions: String,
    prep_time: String,
    calories: i64,
    servings: i64,
    tags: String,
    nutrition_info: Option<String>,
    images: String,
    detected_ingredients: String,
    created_at: String,
}

impl RecipeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            difficulty: row.get(4)?,
            ingredients: row.get(5)?,
            instructions: row.get(6)?,
            prep_time: row.get(7)?,
            calories: row.get(8)?,
            servings: row.get(9)?,
            tags: row.get(10)?,
            nutrition_info: row.get(11)?,
            images: row.get(12)?,
            detected_ingredients: row.get(13)?,
            created_at: row.get(14)?,
        })
    }

    /// Rebuilds the record through serde so the stored enum spellings are
    /// validated the same way as API input.
    fn into_recipe(self) -> Result<Recipe, DatabaseError> {
        let nutrition_info = match self.nutrition_info {
            Some(text) => serde_json::from_str::<Value>(&text)?,
            None => Value::Null,
        };

        let value = json!({
            "id": self.id,
            "user_id": self.user_id,
            "name": self.name,
            "type": self.category,
            "difficulty": self.difficulty,
            "ingredients": serde_json::from_str::<Value>(&self.ingredients)?,
            "instructions": serde_json::from_str::<Value>(&self.instructions)?,
            "prep_time": self.prep_time,
            "calories": self.calories,
            "servings": self.servings,
            "tags": serde_json::from_str::<Value>(&self.tags)?,
            "nutrition_info": nutrition_info,
            "images": serde_json::from_str::<Value>(&self.images)?,
            "detected_ingredients": serde_json::from_str::<Value>(&self.detected_ingredients)?,
            "created_at": self.created_at,
        });

        Ok(serde_json::from_value(value)?)
    }
}

fn enum_text<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Connection(e.to_string()))?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self { conn: Arc::new(conn) };
        db.initialize().await?;
        Ok(db)
    }

    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self { conn: Arc::new(conn) };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS recipes (
                        id TEXT PRIMARY KEY,
                        user_id TEXT NOT NULL,
                        name TEXT NOT NULL,
                        type TEXT NOT NULL,
                        difficulty TEXT,
                        ingredients TEXT NOT NULL,
                        instructions TEXT NOT NULL,
                        prep_time TEXT NOT NULL DEFAULT '',
                        calories INTEGER NOT NULL DEFAULT 0,
                        servings INTEGER NOT NULL DEFAULT 0,
                        tags TEXT NOT NULL DEFAULT '[]',
                        nutrition_info TEXT,
                        images TEXT NOT NULL DEFAULT '[]',
                        detected_ingredients TEXT NOT NULL DEFAULT '[]',
                        created_at TEXT NOT NULL
                    );
                    CREATE INDEX IF NOT EXISTS idx_recipes_user_created
                        ON recipes (user_id, created_at);
                    CREATE TABLE IF NOT EXISTS favorites (
                        user_id TEXT NOT NULL,
                        recipe_id TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        PRIMARY KEY (user_id, recipe_id)
                    );",
                )
            })
            .await?;

        info!("Database initialized successfully");
        Ok(())
    }

    async fn query_recipes(&self, sql: String, args: Vec<String>) -> Result<Vec<Recipe>, DatabaseError> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), RecipeRow::from_row)?;

                let mut recipes = Vec::new();
                for row in rows {
                    recipes.push(row?);
                }

                Ok(recipes)
            })
            .await?;

        rows.into_iter().map(RecipeRow::into_recipe).collect()
    }
}

#[async_trait]
impl RecipeStore for Database {
    async fn list_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DatabaseError> {
        self.query_recipes(
            format!(
                "SELECT {} FROM recipes WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
                RECIPE_COLUMNS
            ),
            vec![user_id.to_string()],
        )
        .await
    }

    async fn get_recipe(&self, user_id: &str, recipe_id: &str) -> Result<Option<Recipe>, DatabaseError> {
        let mut recipes = self
            .query_recipes(
                format!("SELECT {} FROM recipes WHERE user_id = ?1 AND id = ?2", RECIPE_COLUMNS),
                vec![user_id.to_string(), recipe_id.to_string()],
            )
            .await?;
        Ok(recipes.pop())
    }

    async fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let draft = &recipe.draft;
        let category = enum_text(&draft.category)?;
        let difficulty = draft.difficulty.as_ref().map(enum_text).transpose()?;
        let ingredients = serde_json::to_string(&draft.ingredients)?;
        let instructions = serde_json::to_string(&draft.instructions)?;
        let tags = serde_json::to_string(&draft.tags)?;
        let nutrition_info = draft
            .nutrition_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let images = serde_json::to_string(&recipe.images)?;
        let detected = serde_json::to_string(&recipe.detected_ingredients)?;

        let user_id = recipe.user_id.clone();
        let name = draft.name.clone();
        let prep_time = draft.prep_time.clone();
        let calories = i64::from(draft.calories);
        let servings = i64::from(draft.servings);
        let row_id = id.clone();
        let row_created_at = created_at.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO recipes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                        RECIPE_COLUMNS
                    ),
                    params![
                        row_id,
                        user_id,
                        name,
                        category,
                        difficulty,
                        ingredients,
                        instructions,
                        prep_time,
                        calories,
                        servings,
                        tags,
                        nutrition_info,
                        images,
                        detected,
                        row_created_at,
                    ],
                )
            })
            .await?;

        info!("Saved recipe {} for {}", id, recipe.user_id);

        Ok(Recipe {
            id,
            user_id: recipe.user_id,
            draft: recipe.draft,
            images: recipe.images,
            detected_ingredients: recipe.detected_ingredients,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError> {
        let user_id = user_id.to_string();
        let recipe_id = recipe_id.to_string();

        let deleted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let deleted = tx.execute(
                    "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2",
                    params![recipe_id, user_id],
                )?;
                if deleted > 0 {
                    tx.execute("DELETE FROM favorites WHERE recipe_id = ?1", params![recipe_id])?;
                }
                tx.commit()?;
                Ok(deleted)
            })
            .await?;

        Ok(deleted > 0)
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let user_id = user_id.to_string();

        let favorites = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT recipe_id FROM favorites WHERE user_id = ?1 ORDER BY created_at DESC",
                )?;
                let rows = stmt.query_map([&user_id], |row| row.get::<_, String>(0))?;

                let mut favorites = Vec::new();
                for row in rows {
                    favorites.push(row?);
                }

                Ok(favorites)
            })
            .await?;

        Ok(favorites)
    }

    async fn is_favorite(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError> {
        let user_id = user_id.to_string();
        let recipe_id = recipe_id.to_string();

        let found = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT 1 FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
                    params![user_id, recipe_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
            })
            .await?;

        Ok(found.is_some())
    }

    async fn add_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError> {
        let user_id = user_id.to_string();
        let recipe_id = recipe_id.to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO favorites (user_id, recipe_id, created_at) VALUES (?1, ?2, ?3)",
                    params![user_id, recipe_id, created_at],
                )
            })
            .await?;

        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError> {
        let user_id = user_id.to_string();
        let recipe_id = recipe_id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
                    params![user_id, recipe_id],
                )
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::recipe::{Category, Difficulty, NutritionInfo, RecipeDraft};

    fn new_recipe(user_id: &str, name: &str) -> NewRecipe {
        NewRecipe {
            user_id: user_id.to_string(),
            draft: RecipeDraft {
                name: name.to_string(),
                category: Category::Savory,
                difficulty: Some(Difficulty::Hard),
                ingredients: vec!["grão-de-bico".to_string(), "tahine".to_string()],
                instructions: vec!["Cozinhe".to_string(), "Bata".to_string()],
                prep_time: "40 min".to_string(),
                calories: 260,
                servings: 4,
                tags: vec!["vegano".to_string()],
                nutrition_info: Some(NutritionInfo {
                    protein: Some("9g".to_string()),
                    ..Default::default()
                }),
            },
            images: vec!["data:image/png;base64,AAAA".to_string()],
            detected_ingredients: vec!["grão-de-bico".to_string()],
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_round_trip() {
        let db = Database::open_in_memory().await.unwrap();

        let saved = db.insert_recipe(new_recipe("user_a", "Homus")).await.unwrap();
        assert!(!saved.id.is_empty());

        let listed = db.list_recipes("user_a").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].draft, saved.draft);
        assert_eq!(listed[0].images, saved.images);

        assert!(db.list_recipes("user_b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(new_recipe("user_a", "Primeira")).await.unwrap();
        db.insert_recipe(new_recipe("user_a", "Segunda")).await.unwrap();

        let names: Vec<String> = db
            .list_recipes("user_a")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.draft.name)
            .collect();
        assert_eq!(names, vec!["Segunda", "Primeira"]);
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner_and_drops_favorites() {
        let db = Database::open_in_memory().await.unwrap();
        let saved = db.insert_recipe(new_recipe("user_a", "Homus")).await.unwrap();
        db.add_favorite("user_a", &saved.id).await.unwrap();

        assert!(!db.delete_recipe("user_b", &saved.id).await.unwrap());
        assert!(db.is_favorite("user_a", &saved.id).await.unwrap());

        assert!(db.delete_recipe("user_a", &saved.id).await.unwrap());
        assert!(db.get_recipe("user_a", &saved.id).await.unwrap().is_none());
        assert!(db.list_favorites("user_a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let db = Database::open_in_memory().await.unwrap();

        assert!(db.toggle_favorite("user_a", "r1").await.unwrap());
        assert_eq!(db.list_favorites("user_a").await.unwrap(), vec!["r1"]);

        // Adding twice keeps a single row.
        db.add_favorite("user_a", "r1").await.unwrap();
        assert_eq!(db.list_favorites("user_a").await.unwrap().len(), 1);

        assert!(!db.toggle_favorite("user_a", "r1").await.unwrap());
        assert!(db.list_favorites("user_a").await.unwrap().is_empty());
    }
}
