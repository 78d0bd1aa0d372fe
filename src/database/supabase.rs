use async_trait::async_trait;
use log::{error, info};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::store::{DatabaseError, RecipeStore};
use crate::food::recipe::{NewRecipe, Recipe};

/// Recipe store backed by a hosted Supabase project, spoken to through its
/// PostgREST interface.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct FavoriteRow {
    recipe_id: String,
}

/// PostgREST equality filter value.
pub(crate) fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl SupabaseStore {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, DatabaseError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| DatabaseError::Connection(format!("Invalid SUPABASE_URL '{}': {}", base_url, e)))?;

        info!("Using Supabase recipe store at {}", parsed.origin().ascii_serialization());

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub(crate) fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn check(response: Response) -> Result<Response, DatabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Supabase request failed: Status {}, Body: {}", status, body);
        Err(DatabaseError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecipeStore for SupabaseStore {
    async fn list_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DatabaseError> {
        let response = self
            .request(Method::GET, "recipes")
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_recipe(&self, user_id: &str, recipe_id: &str) -> Result<Option<Recipe>, DatabaseError> {
        let response = self
            .request(Method::GET, "recipes")
            .query(&[
                ("select", "*".to_string()),
                ("id", eq(recipe_id)),
                ("user_id", eq(user_id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let mut recipes: Vec<Recipe> = Self::check(response).await?.json().await?;
        Ok(recipes.pop())
    }

    async fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let response = self
            .request(Method::POST, "recipes")
            .header("Prefer", "return=representation")
            .json(&recipe)
            .send()
            .await?;

        let mut inserted: Vec<Recipe> = Self::check(response).await?.json().await?;
        inserted.pop().ok_or_else(|| DatabaseError::Remote {
            status: 200,
            body: "insert returned no rows".to_string(),
        })
    }

    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError> {
        let response = self
            .request(Method::DELETE, "recipes")
            .header("Prefer", "return=representation")
            .query(&[("id", eq(recipe_id)), ("user_id", eq(user_id))])
            .send()
            .await?;

        let deleted: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        if deleted.is_empty() {
            return Ok(false);
        }

        let response = self
            .request(Method::DELETE, "favorites")
            .query(&[("recipe_id", eq(recipe_id))])
            .send()
            .await?;
        Self::check(response).await?;

        Ok(true)
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let response = self
            .request(Method::GET, "favorites")
            .query(&[("select", "recipe_id".to_string()), ("user_id", eq(user_id))])
            .send()
            .await?;

        let rows: Vec<FavoriteRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(|row| row.recipe_id).collect())
    }

    async fn is_favorite(&self, user_id: &str, recipe_id: &str) -> Result<bool, DatabaseError> {
        let response = self
            .request(Method::GET, "favorites")
            .query(&[
                ("select", "recipe_id".to_string()),
                ("user_id", eq(user_id)),
                ("recipe_id", eq(recipe_id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<FavoriteRow> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn add_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError> {
        let response = self
            .request(Method::POST, "favorites")
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&json!({ "user_id": user_id, "recipe_id": recipe_id }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), DatabaseError> {
        let response = self
            .request(Method::DELETE, "favorites")
            .query(&[("user_id", eq(user_id)), ("recipe_id", eq(recipe_id))])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// One request as the stub PostgREST server saw it.
    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        path: String,
        query: String,
        apikey: Option<String>,
        prefer: Option<String>,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    /// Serves `body` with `status` for `table` (or everything when `None`) and `[]` elsewhere.
    async fn stub_server(status: StatusCode, table: Option<&'static str>, body: Value) -> (String, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let seen = log.clone();

        let app = axum::Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v.to_string())
                };
                let path = uri.path().to_string();
                seen.lock().unwrap().push(Seen {
                    method,
                    path: path.clone(),
                    query: uri.query().unwrap_or_default().to_string(),
                    apikey: header("apikey"),
                    prefer: header("prefer"),
                });

                let matches = table.map_or(true, |t| path.ends_with(&format!("/{}", t)));
                if matches {
                    (status, axum::Json(body))
                } else {
                    (StatusCode::OK, axum::Json(json!([])))
                }
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), log)
    }

    fn seen(log: &Log) -> Vec<Seen> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_list_sends_owner_filter_and_order() {
        let (url, log) = stub_server(StatusCode::OK, None, json!([])).await;
        let store = SupabaseStore::new(&url, "anon-key").unwrap();

        assert!(store.list_recipes("user_1").await.unwrap().is_empty());

        let requests = seen(&log);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "/rest/v1/recipes");
        assert!(requests[0].query.contains("user_id=eq.user_1"));
        assert!(requests[0].query.contains("order=created_at.desc"));
        assert_eq!(requests[0].apikey.as_deref(), Some("anon-key"));
    }

    #[tokio::test]
    async fn test_error_status_becomes_remote_error() {
        let (url, _) = stub_server(
            StatusCode::SERVICE_UNAVAILABLE,
            None,
            json!({ "message": "database is down" }),
        )
        .await;
        let store = SupabaseStore::new(&url, "anon-key").unwrap();

        match store.list_recipes("user_1").await {
            Err(DatabaseError::Remote { status, body }) => {
                assert_eq!(status, 503);
                assert!(body.contains("database is down"));
            }
            other => panic!("expected remote error, got {:?}", other.map(|r| r.len())),
        }

        let (url, _) = stub_server(StatusCode::UNAUTHORIZED, Some("favorites"), json!({})).await;
        let store = SupabaseStore::new(&url, "anon-key").unwrap();
        assert!(matches!(
            store.add_favorite("user_1", "r1").await,
            Err(DatabaseError::Remote { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_of_missing_recipe_leaves_favorites_alone() {
        let (url, log) = stub_server(StatusCode::OK, None, json!([])).await;
        let store = SupabaseStore::new(&url, "anon-key").unwrap();

        assert!(!store.delete_recipe("user_1", "r1").await.unwrap());

        let requests = seen(&log);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::DELETE);
        assert_eq!(requests[0].path, "/rest/v1/recipes");
        assert!(requests[0].query.contains("id=eq.r1"));
        assert!(requests[0].query.contains("user_id=eq.user_1"));
        assert_eq!(requests[0].prefer.as_deref(), Some("return=representation"));
    }

    #[tokio::test]
    async fn test_delete_removes_favorites_of_the_recipe() {
        let (url, log) = stub_server(StatusCode::OK, Some("recipes"), json!([{ "id": "r1" }])).await;
        let store = SupabaseStore::new(&url, "anon-key").unwrap();

        assert!(store.delete_recipe("user_1", "r1").await.unwrap());

        let requests = seen(&log);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].path, "/rest/v1/favorites");
        assert_eq!(requests[1].query, "recipe_id=eq.r1");
    }

    #[test]
    fn test_table_url_and_filters() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "anon").unwrap();
        assert_eq!(store.table_url("recipes"), "https://abc.supabase.co/rest/v1/recipes");
        assert_eq!(eq("user_1"), "eq.user_1");
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(matches!(
            SupabaseStore::new("not a url", "anon"),
            Err(DatabaseError::Connection(_))
        ));
    }

    #[test]
    fn test_decodes_postgrest_row() {
        let row = json!({
            "id": "5f0c1d7e-2a4b-4c1e-9a53-0c2f0d1b6a11",
            "user_id": "user_1700000000000_abc123xyz",
            "name": "Bowl de quinoa",
            "type": "salgado",
            "difficulty": null,
            "ingredients": ["quinoa", "pepino"],
            "instructions": ["Cozinhe a quinoa", "Monte o bowl"],
            "prep_time": "20 min",
            "calories": 380,
            "servings": 2,
            "tags": null,
            "nutrition_info": { "protein": "12g" },
            "images": null,
            "detected_ingredients": ["quinoa"],
            "created_at": "2025-03-01T12:30:00.123456+00:00"
        });

        let recipe: Recipe = serde_json::from_value(row).unwrap();
        assert_eq!(recipe.draft.name, "Bowl de quinoa");
        assert!(recipe.images.is_empty());
        assert_eq!(recipe.detected_ingredients, vec!["quinoa"]);
    }
}
