use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::info;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::error::{ApiError, ApiResult};
use super::{AppState, RequestLocale};
use crate::food::images;
use crate::food::messages::Locale;
use crate::food::share::{share_payload, SharePayload};
use crate::food::{NewRecipe, Recipe, RecipeDraft};
use crate::user::{is_valid_user_id, new_user_id};

fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if is_valid_user_id(user_id) {
        Ok(())
    } else {
        Err(ValidationError::new("user_id"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(custom = "validate_user_id")]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveRecipeRequest {
    #[validate(custom = "validate_user_id")]
    pub user_id: String,
    #[validate]
    pub recipe: RecipeDraft,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub detected_ingredients: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ToggleFavoriteRequest {
    #[validate(custom = "validate_user_id")]
    pub user_id: String,
    #[validate(length(min = 1, max = 128))]
    pub recipe_id: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    user_id: String,
}

#[derive(Serialize)]
pub struct RecipeListResponse {
    recipes: Vec<Recipe>,
}

#[derive(Serialize)]
pub struct FavoritesResponse {
    recipe_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct FavoriteResponse {
    recipe_id: String,
    favorite: bool,
}

fn user_query(query: Result<Query<UserQuery>, QueryRejection>, locale: Locale) -> ApiResult<String> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::bad_request(locale, e.to_string()))?;
    Ok(query.user_id)
}

fn json_body<T: Validate>(payload: Result<Json<T>, JsonRejection>, locale: Locale) -> ApiResult<T> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;
    body.validate()
        .map_err(|e| ApiError::bad_request(locale, e.to_string()))?;
    Ok(body)
}

pub async fn create_user_handler() -> Json<UserResponse> {
    let user_id = new_user_id();
    info!("Issued user id {}", user_id);
    Json(UserResponse { user_id })
}

pub async fn list_recipes_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<RecipeListResponse>> {
    let user_id = user_query(query, locale)?;

    let recipes = state
        .store
        .list_recipes(&user_id)
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?;

    Ok(Json(RecipeListResponse { recipes }))
}

pub async fn save_recipe_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<SaveRecipeRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = json_body(payload, locale)?;

    if request.images.iter().any(|image| !images::is_image_reference(image)) {
        return Err(ApiError::bad_request(locale, "images must be data:image/ or http(s) URLs"));
    }

    let recipe = state
        .store
        .insert_recipe(NewRecipe {
            user_id: request.user_id,
            draft: request.recipe,
            images: request.images,
            detected_ingredients: request.detected_ingredients,
        })
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?;

    info!("Saved recipe {} for {}", recipe.id, recipe.user_id);
    Ok((StatusCode::CREATED, Json(recipe)).into_response())
}

pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(recipe_id): Path<String>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let user_id = user_query(query, locale)?;

    let deleted = state
        .store
        .delete_recipe(&user_id, &recipe_id)
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?;

    if deleted {
        info!("Deleted recipe {} for {}", recipe_id, user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(locale))
    }
}

pub async fn share_recipe_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(recipe_id): Path<String>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<SharePayload>> {
    let user_id = user_query(query, locale)?;

    let recipe = state
        .store
        .get_recipe(&user_id, &recipe_id)
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?
        .ok_or_else(|| ApiError::not_found(locale))?;

    Ok(Json(share_payload(&recipe.draft, locale)))
}

pub async fn list_favorites_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<FavoritesResponse>> {
    let user_id = user_query(query, locale)?;

    let recipe_ids = state
        .store
        .list_favorites(&user_id)
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?;

    Ok(Json(FavoritesResponse { recipe_ids }))
}

pub async fn toggle_favorite_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<ToggleFavoriteRequest>, JsonRejection>,
) -> ApiResult<Json<FavoriteResponse>> {
    let request = json_body(payload, locale)?;

    let favorite = state
        .store
        .toggle_favorite(&request.user_id, &request.recipe_id)
        .await
        .map_err(|e| ApiError::from_storage(e, locale))?;

    Ok(Json(FavoriteResponse {
        recipe_id: request.recipe_id,
        favorite,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_request_validation() {
        let request: SaveRecipeRequest = serde_json::from_value(json!({
            "user_id": "user_1700000000000_abc123xyz",
            "recipe": {
                "name": "Panqueca de banana",
                "type": "doce",
                "ingredients": ["1 banana", "2 ovos"],
                "instructions": ["Amasse a banana", "Misture e doure"]
            }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.images.is_empty());

        let request: SaveRecipeRequest = serde_json::from_value(json!({
            "user_id": "has spaces",
            "recipe": {
                "name": "",
                "type": "doce",
                "ingredients": [],
                "instructions": ["x"]
            }
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_toggle_request_validation() {
        let request = ToggleFavoriteRequest {
            user_id: "user_1".to_string(),
            recipe_id: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
