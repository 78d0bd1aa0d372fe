use axum::{
    async_trait,
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequestParts, Multipart, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod recipes;

use crate::config::AppConfig;
use crate::database::RecipeStore;
use crate::food::images;
use crate::food::messages::{text, Locale, Message};
use crate::food::{Chef, RecipeDraft};
use crate::providers::traits::{check_key_format, ProviderError};
use error::{ApiError, ApiResult, LegacyEndpoint};

#[derive(Clone)]
pub struct AppState {
    pub chef: Chef,
    pub store: Arc<dyn RecipeStore>,
    pub config: Arc<AppConfig>,
}

/// Response language: the first supported `Accept-Language` entry, else the configured default.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(Locale::from_accept_language)
            .unwrap_or(state.config.locale);
        Ok(RequestLocale(locale))
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeFoodRequest {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRecipesRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestKeyRequest {
    #[serde(default, rename = "apiKey", alias = "api_key")]
    pub api_key: Option<String>,
}

#[derive(Serialize)]
pub struct IngredientsResponse {
    ingredients: Vec<String>,
}

#[derive(Serialize)]
pub struct RecipesResponse {
    recipes: Vec<RecipeDraft>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
}

/// Create and configure the API router
pub fn create_api(chef: Chef, store: Arc<dyn RecipeStore>, config: AppConfig) -> Router {
    let body_limit = config.body_limit();
    let max_concurrent = config.max_concurrent_analyses.max(1);

    let state = AppState {
        chef,
        store,
        config: Arc::new(config),
    };

    info!(
        "Setting up API server (body limit {} bytes, {} concurrent analyses)",
        body_limit, max_concurrent
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    // Every route here costs one or more model calls; they share one permit pool.
    let ai_routes = Router::new()
        .route("/api/analyze-food", post(analyze_food_handler))
        .route("/api/analyze-images", post(analyze_images_handler))
        .route("/api/generate-recipes", post(generate_recipes_handler))
        .route("/api/test-openai", post(test_key_handler))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/check-api-key", get(check_key_handler))
        .route("/api/users", post(recipes::create_user_handler))
        .route(
            "/api/recipes",
            get(recipes::list_recipes_handler).post(recipes::save_recipe_handler),
        )
        .route("/api/recipes/:id", delete(recipes::delete_recipe_handler))
        .route("/api/recipes/:id/share", get(recipes::share_recipe_handler))
        .route("/api/favorites", get(recipes::list_favorites_handler))
        .route("/api/favorites/toggle", post(recipes::toggle_favorite_handler))
        .merge(ai_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Rejects anything that is not an inline image or an http(s) link, and
/// inline images above the configured size.
fn check_image_references(images: &[String], max_bytes: usize, locale: Locale) -> ApiResult<()> {
    for image in images {
        if !images::is_image_reference(image) {
            return Err(ApiError::image(locale, Message::ImageRejected, max_bytes));
        }
        if images::data_url_size(image).is_some_and(|size| size >= max_bytes) {
            return Err(ApiError::image(locale, Message::ImageTooLarge, max_bytes));
        }
    }
    Ok(())
}

async fn analyze_food_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<AnalyzeFoodRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;

    if request.images.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, locale, Message::NoImages));
    }
    check_image_references(&request.images, state.config.max_image_bytes, locale)?;

    info!("Analyzing {} image(s)", request.images.len());

    let analysis = state
        .chef
        .analyze(&request.images, locale)
        .await
        .map_err(|e| ApiError::from_analysis(e, locale))?;

    Ok(Json(analysis).into_response())
}

async fn analyze_images_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    mut multipart: Multipart,
) -> ApiResult<Json<IngredientsResponse>> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(locale, e.body_text()))?
    {
        if field.name() != Some("images") {
            continue;
        }

        let declared = field.content_type().map(|c| c.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(locale, e.body_text()))?;

        let data_url = images::to_data_url(&bytes, declared.as_deref(), state.config.max_image_bytes)
            .map_err(|e| {
                warn!("Rejected upload: {}", e);
                ApiError::from_image(e, locale, state.config.max_image_bytes)
            })?;
        uploads.push(data_url);
    }

    let ingredients = state
        .chef
        .detect_ingredients(&uploads, locale)
        .await
        .map_err(|e| ApiError::from_legacy(e, locale, LegacyEndpoint::Images))?;

    Ok(Json(IngredientsResponse { ingredients }))
}

async fn generate_recipes_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<GenerateRecipesRequest>, JsonRejection>,
) -> ApiResult<Json<RecipesResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;

    let recipes = state
        .chef
        .suggest_recipes(&request.ingredients, locale)
        .await
        .map_err(|e| ApiError::from_legacy(e, locale, LegacyEndpoint::Recipes))?;

    Ok(Json(RecipesResponse { recipes }))
}

async fn check_key_handler(State(state): State<AppState>) -> Response {
    let configured = state.chef.provider().check_credentials().is_ok();
    Json(json!({ "configured": configured })).into_response()
}

async fn test_key_handler(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    payload: Result<Json<TestKeyRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(locale, e.body_text()))?;
    let api_key = request.api_key.as_deref().map(str::trim).unwrap_or_default();

    if check_key_format(Some(api_key)).is_err() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, locale, Message::KeyTestBadFormat));
    }

    match state.chef.provider().validate_key(api_key).await {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": text(locale, Message::KeyTestOk),
        }))
        .into_response()),
        Err(e) if e.is_invalid_key() => {
            warn!("Submitted API key was rejected: {}", e);
            Err(ApiError::new(StatusCode::UNAUTHORIZED, locale, Message::KeyTestInvalid))
        }
        Err(e) => Err(key_test_failure(e, locale)),
    }
}

fn key_test_failure(err: ProviderError, locale: Locale) -> ApiError {
    log::error!("Error validating API key: {}", err);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, locale, Message::KeyTestFailed)
}

async fn health_check(RequestLocale(locale): RequestLocale) -> Response {
    Json(StatusResponse {
        status: text(locale, Message::Healthy).to_string(),
    })
    .into_response()
}
