use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;

use crate::database::DatabaseError;
use crate::food::analysis::AnalysisError;
use crate::food::images::ImageError;
use crate::food::messages::{image_limit_hint, text, ErrorBody, Locale, Message};
use crate::providers::traits::ProviderError;

/// Which of the single-call endpoints failed; they only distinguish
/// "the AI API said no" from "something else broke".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEndpoint {
    Images,
    Recipes,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, locale: Locale, message: Message) -> Self {
        Self {
            status,
            body: ErrorBody::new(locale, message),
        }
    }

    pub fn with_details(status: StatusCode, locale: Locale, message: Message, details: Message) -> Self {
        Self {
            status,
            body: ErrorBody::with_details(locale, message, details),
        }
    }

    pub fn bad_request(locale: Locale, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: text(locale, Message::InvalidRequest).to_string(),
                details: Some(details.into()),
            },
        }
    }

    pub fn not_found(locale: Locale) -> Self {
        Self::new(StatusCode::NOT_FOUND, locale, Message::RecipeNotFound)
    }

    /// Full classification used by the image analysis endpoint.
    pub fn from_analysis(err: AnalysisError, locale: Locale) -> Self {
        match err {
            AnalysisError::NoImages => Self::new(StatusCode::BAD_REQUEST, locale, Message::NoImages),
            AnalysisError::NoIngredientsGiven => {
                Self::new(StatusCode::BAD_REQUEST, locale, Message::NoIngredientsGiven)
            }
            AnalysisError::IngredientsUnreadable => {
                Self::new(StatusCode::BAD_REQUEST, locale, Message::IngredientsUnreadable)
            }
            AnalysisError::NoIngredients => {
                Self::new(StatusCode::BAD_REQUEST, locale, Message::NoIngredientsDetected)
            }
            AnalysisError::RecipesUnreadable => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, Message::RecipesUnreadable)
            }
            AnalysisError::NoValidRecipes => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, Message::NoValidRecipes)
            }
            AnalysisError::Provider(e) => Self::from_provider(e, locale),
        }
    }

    pub fn from_provider(err: ProviderError, locale: Locale) -> Self {
        error!("Error processing images: {}", err);

        match &err {
            ProviderError::MissingKey => Self::with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                locale,
                Message::KeyMissing,
                Message::KeyMissingDetails,
            ),
            ProviderError::InvalidKeyFormat => Self::with_details(
                StatusCode::INTERNAL_SERVER_ERROR,
                locale,
                Message::KeyFormat,
                Message::KeyFormatDetails,
            ),
            e if e.is_invalid_key() => Self::with_details(
                StatusCode::UNAUTHORIZED,
                locale,
                Message::KeyInvalid,
                Message::KeyInvalidDetails,
            ),
            e if e.status() == Some(429) => Self::with_details(
                StatusCode::TOO_MANY_REQUESTS,
                locale,
                Message::RateLimited,
                Message::RateLimitedDetails,
            ),
            e if e.status() == Some(403) => Self::with_details(
                StatusCode::FORBIDDEN,
                locale,
                Message::AccessDenied,
                Message::AccessDeniedDetails,
            ),
            e => {
                let details = match e {
                    ProviderError::Status { message, .. } if !message.is_empty() => message.clone(),
                    ProviderError::Status { .. } => text(locale, Message::UnknownError).to_string(),
                    other => other.to_string(),
                };
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: text(locale, Message::ProcessingFailed).to_string(),
                        details: Some(details),
                    },
                }
            }
        }
    }

    pub fn from_legacy(err: AnalysisError, locale: Locale, endpoint: LegacyEndpoint) -> Self {
        error!("Legacy {:?} endpoint failed: {}", endpoint, err);

        match err {
            AnalysisError::NoImages => Self::new(StatusCode::BAD_REQUEST, locale, Message::NoImages),
            AnalysisError::NoIngredientsGiven => {
                Self::new(StatusCode::BAD_REQUEST, locale, Message::NoIngredientsGiven)
            }
            AnalysisError::Provider(ProviderError::MissingKey | ProviderError::InvalidKeyFormat) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, Message::LegacyKeyMissing)
            }
            AnalysisError::Provider(ProviderError::Status { .. }) => {
                let message = match endpoint {
                    LegacyEndpoint::Images => Message::LegacyAnalyzeFailed,
                    LegacyEndpoint::Recipes => Message::LegacyGenerateFailed,
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, message)
            }
            _ => {
                let message = match endpoint {
                    LegacyEndpoint::Images => Message::LegacyImagesInternal,
                    LegacyEndpoint::Recipes => Message::LegacyRecipesInternal,
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, message)
            }
        }
    }

    /// 400 for an unusable upload, with the size limit as the hint.
    pub fn image(locale: Locale, message: Message, max_bytes: usize) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: text(locale, message).to_string(),
                details: Some(image_limit_hint(locale, max_bytes)),
            },
        }
    }

    pub fn from_image(err: ImageError, locale: Locale, max_bytes: usize) -> Self {
        match err {
            ImageError::TooLarge { limit, .. } => Self::image(locale, Message::ImageTooLarge, limit),
            ImageError::NotAnImage(_) | ImageError::Empty => {
                Self::image(locale, Message::ImageRejected, max_bytes)
            }
        }
    }

    pub fn from_storage(err: DatabaseError, locale: Locale) -> Self {
        error!("Database error: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, locale, Message::StorageFailed)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, code: Option<&str>) -> AnalysisError {
        AnalysisError::Provider(ProviderError::Status {
            status,
            code: code.map(|c| c.to_string()),
            message: "upstream said no".to_string(),
        })
    }

    #[test]
    fn test_provider_status_mapping() {
        let cases = [
            (status_error(401, None), StatusCode::UNAUTHORIZED),
            (status_error(400, Some("invalid_api_key")), StatusCode::UNAUTHORIZED),
            (status_error(429, None), StatusCode::TOO_MANY_REQUESTS),
            (status_error(403, None), StatusCode::FORBIDDEN),
            (status_error(502, None), StatusCode::INTERNAL_SERVER_ERROR),
            (AnalysisError::Provider(ProviderError::MissingKey), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from_analysis(err, Locale::PtBr).status, expected);
        }
    }

    #[test]
    fn test_unclassified_failure_carries_upstream_message() {
        let err = ApiError::from_analysis(status_error(500, None), Locale::En);
        assert_eq!(err.body.error, "Failed to process the images.");
        assert_eq!(err.body.details.as_deref(), Some("upstream said no"));
    }

    #[test]
    fn test_output_errors_mapping() {
        let unreadable = ApiError::from_analysis(AnalysisError::IngredientsUnreadable, Locale::PtBr);
        assert_eq!(unreadable.status, StatusCode::BAD_REQUEST);
        assert!(unreadable.body.details.is_none());

        let no_recipes = ApiError::from_analysis(AnalysisError::NoValidRecipes, Locale::PtBr);
        assert_eq!(no_recipes.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            no_recipes.body.error,
            "Não foi possível gerar receitas válidas. Tente novamente."
        );
    }

    #[test]
    fn test_legacy_mapping_collapses_provider_errors() {
        let err = ApiError::from_legacy(status_error(429, None), Locale::PtBr, LegacyEndpoint::Recipes);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Erro ao gerar receitas. Verifique sua chave da OpenAI.");

        let err = ApiError::from_legacy(AnalysisError::IngredientsUnreadable, Locale::PtBr, LegacyEndpoint::Images);
        assert_eq!(err.body.error, "Erro interno ao processar imagens");
    }

    #[test]
    fn test_image_errors_name_the_configured_limit() {
        let err = ApiError::from_image(ImageError::TooLarge { size: 3_000_000, limit: 2 * 1024 * 1024 }, Locale::PtBr, 0);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Imagem muito grande.");
        assert_eq!(err.body.details.as_deref(), Some("Use apenas imagens menores que 2MB."));

        let err = ApiError::from_image(ImageError::Empty, Locale::En, 5 * 1024 * 1024);
        assert_eq!(err.body.error, "Some files were ignored.");
        assert_eq!(err.body.details.as_deref(), Some("Use only images smaller than 5MB."));
    }
}
