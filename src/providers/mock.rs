use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::providers::traits::{ChatProvider, ChatRequest, ProviderError};

/// Scripted reply for one `complete` call.
pub enum MockReply {
    Content(String),
    Status { status: u16, code: Option<String> },
}

/// A provider that plays back canned replies in order and records every request.
pub struct MockProvider {
    credentials_ok: bool,
    key_status: Option<u16>,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            credentials_ok: true,
            key_status: None,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn without_key(mut self) -> Self {
        self.credentials_ok = false;
        self
    }

    /// Makes `validate_key` fail with the given status.
    pub fn rejecting_keys(mut self, status: u16) -> Self {
        self.key_status = Some(status);
        self
    }

    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.push(MockReply::Content(content.into()));
        self
    }

    pub fn with_status(self, status: u16, code: Option<&str>) -> Self {
        self.push(MockReply::Status {
            status,
            code: code.map(|c| c.to_string()),
        });
        self
    }

    fn push(&self, reply: MockReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn check_credentials(&self) -> Result<(), ProviderError> {
        if self.credentials_ok {
            Ok(())
        } else {
            Err(ProviderError::MissingKey)
        }
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());

        match reply {
            Some(MockReply::Content(content)) => Ok(content),
            Some(MockReply::Status { status, code }) => Err(ProviderError::Status {
                status,
                code,
                message: format!("mock failure {}", status),
            }),
            None => Err(ProviderError::InvalidResponse("no scripted reply left".to_string())),
        }
    }

    async fn validate_key(&self, _api_key: &str) -> Result<(), ProviderError> {
        match self.key_status {
            Some(status) => Err(ProviderError::Status {
                status,
                code: None,
                message: "key rejected".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
