use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingKey,
    #[error("API key has an invalid format (expected an 'sk-' prefix)")]
    InvalidKeyFormat,
    #[error("API request failed: Status {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_invalid_key(&self) -> bool {
        match self {
            ProviderError::Status { status, code, .. } => {
                *status == 401 || code.as_deref() == Some("invalid_api_key")
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying a text instruction followed by one part per image.
    pub fn user_with_images(text: impl Into<String>, images: &[String], detail: Option<ImageDetail>) -> Self {
        let mut parts = vec![ContentPart::Text { text: text.into() }];
        parts.extend(images.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.clone(),
                detail,
            },
        }));

        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Fails fast when the configured key is missing or malformed.
    fn check_credentials(&self) -> Result<(), ProviderError>;

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// Checks an arbitrary key against the API, independent of the configured one.
    async fn validate_key(&self, api_key: &str) -> Result<(), ProviderError>;

    fn model(&self) -> &str;
}

pub fn check_key_format(api_key: Option<&str>) -> Result<(), ProviderError> {
    match api_key.map(str::trim) {
        None | Some("") => Err(ProviderError::MissingKey),
        Some(key) if !key.starts_with("sk-") => Err(ProviderError::InvalidKeyFormat),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_key_format() {
        assert!(matches!(check_key_format(None), Err(ProviderError::MissingKey)));
        assert!(matches!(check_key_format(Some("  ")), Err(ProviderError::MissingKey)));
        assert!(matches!(
            check_key_format(Some("pk-123")),
            Err(ProviderError::InvalidKeyFormat)
        ));
        assert!(check_key_format(Some("sk-abc")).is_ok());
    }

    #[test]
    fn test_image_message_serializes_as_parts() {
        let message = ChatMessage::user_with_images(
            "what is this?",
            &["data:image/png;base64,AAAA".to_string()],
            Some(ImageDetail::High),
        );

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "what is this?" },
                    {
                        "type": "image_url",
                        "image_url": { "url": "data:image/png;base64,AAAA", "detail": "high" }
                    }
                ]
            })
        );
    }

    #[test]
    fn test_invalid_key_detection() {
        let by_status = ProviderError::Status {
            status: 401,
            code: None,
            message: "nope".to_string(),
        };
        let by_code = ProviderError::Status {
            status: 400,
            code: Some("invalid_api_key".to_string()),
            message: "nope".to_string(),
        };
        let other = ProviderError::Status {
            status: 429,
            code: None,
            message: "slow down".to_string(),
        };
        assert!(by_status.is_invalid_key());
        assert!(by_code.is_invalid_key());
        assert!(!other.is_invalid_key());
        assert_eq!(other.status(), Some(429));
    }
}
