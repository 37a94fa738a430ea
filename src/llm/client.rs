//! Minimal OpenAI-compatible chat-completion client.
//!
//! Both providers are reached through the same `/chat/completions` surface;
//! only the base URL, key and model differ.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::{AppError, Result};

// ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    response_format: ResponseFormat,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// One configured chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    /// Display name used in logs and error messages.
    name: &'static str,
    config: ProviderConfig,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(http: Client, name: &'static str, config: ProviderConfig, max_tokens: u32) -> Self {
        Self {
            http,
            name,
            config,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Request a JSON-object completion and return the first choice's text.
    ///
    /// A missing or empty message body is reported as `No response from <name>`.
    pub async fn complete_json(&self, messages: &[ChatMessage]) -> Result<String> {
        // ---
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            max_tokens: self.max_tokens,
        };

        let url = self.completions_url();
        debug!("Sending {} chat completion to {} (model {})", self.name, url, self.config.model);

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to send request to {}: {}", self.name, e);
            AppError::Http(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("{} returned {}: {}", self.name, status, text);
            return Err(AppError::upstream(format!(
                "{} API error {}: {}",
                self.name,
                status.as_u16(),
                text
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::upstream(format!("No response from {}", self.name)))
    }
}
