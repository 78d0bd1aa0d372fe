use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::providers::traits::{check_key_format, ChatProvider, ChatRequest, ProviderError};

#[derive(Clone)]
pub struct OpenAIProvider {
    api_key: Option<String>,
    api_url: String,
    client: Client,
    model: String,
}

impl OpenAIProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client: Client::new(),
            model: config.model.clone(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }
}

/// Turns a non-2xx OpenAI response into a classified error.
async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);

    error!("OpenAI request failed: Status {}, Body: {}", status, body);

    ProviderError::Status {
        status,
        code,
        message: message.unwrap_or(body),
    }
}

pub(crate) fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let error = value.get("error");
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string());
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string());
    (code, message)
}

pub(crate) fn extract_content(response_json: &Value) -> Result<String, ProviderError> {
    let choice = response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| {
            let debug_json = serde_json::to_string_pretty(response_json).unwrap_or_default();
            ProviderError::InvalidResponse(debug_json)
        })?;

    // A null or missing content is an empty object to the caller.
    Ok(choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.trim().is_empty())
        .unwrap_or("{}")
        .to_string())
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn check_credentials(&self) -> Result<(), ProviderError> {
        check_key_format(self.api_key.as_deref())
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.check_credentials()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": request.messages,
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(ProviderError::InvalidResponse(format!("API returned error: {}", error)));
        }

        extract_content(&response_json)
    }

    async fn validate_key(&self, api_key: &str) -> Result<(), ProviderError> {
        check_key_format(Some(api_key))?;

        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(api_key.trim())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        info!("API key validated against {}", self.api_url);
        Ok(())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
