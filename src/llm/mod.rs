//! Provider dispatch for health analyses.
//!
//! [`Analyzer`] is the seam between the HTTP layer and the language models;
//! [`LlmAnalyzer`] is the production implementation that talks to OpenAI or
//! Gemini. Both paths return the model's raw JSON, which the caller then
//! normalizes.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::{AppError, Provider, Result};

mod client;
pub mod prompt;

pub use client::{ChatClient, ChatMessage};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid JSON object pattern"));

// ---

/// Produces a raw analysis payload for a health summary.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, provider: Provider, health_summary: &str) -> Result<Value>;
}

/// Analyzer backed by two OpenAI-compatible chat endpoints.
#[derive(Debug, Clone)]
pub struct LlmAnalyzer {
    openai: ChatClient,
    gemini: ChatClient,
}

impl LlmAnalyzer {
    pub fn new(openai: ChatClient, gemini: ChatClient) -> Self {
        Self { openai, gemini }
    }

    /// Build both clients from the loaded configuration, sharing one HTTP pool.
    pub fn from_config(cfg: &Config) -> Self {
        // ---
        let http = reqwest::Client::new();
        Self::new(
            ChatClient::new(http.clone(), "OpenAI", cfg.openai.clone(), cfg.max_tokens),
            ChatClient::new(http, "Gemini", cfg.gemini.clone(), cfg.max_tokens),
        )
    }

    async fn analyze_with_openai(&self, health_summary: &str) -> Result<Value> {
        // ---
        let messages = [
            ChatMessage::system(prompt::ANALYSIS_PROMPT),
            ChatMessage::user(prompt::openai_user_message(health_summary)),
        ];
        let content = self.openai.complete_json(&messages).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn analyze_with_gemini(&self, health_summary: &str) -> Result<Value> {
        // ---
        let messages = [ChatMessage::user(prompt::gemini_user_message(health_summary))];
        let content = self.gemini.complete_json(&messages).await?;

        let json = extract_json_object(&content)
            .ok_or_else(|| AppError::upstream("No JSON found in Gemini response"))?;
        if json.len() != content.trim().len() {
            warn!("Gemini wrapped its JSON in extra text; using the embedded object");
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, provider: Provider, health_summary: &str) -> Result<Value> {
        // ---
        let model = match provider {
            Provider::OpenAi => self.openai.model(),
            Provider::Gemini => self.gemini.model(),
        };
        info!("Dispatching analysis to {} ({})", provider.display_name(), model);
        debug!("Health summary:\n{}", health_summary);

        match provider {
            Provider::OpenAi => self.analyze_with_openai(health_summary).await,
            Provider::Gemini => self.analyze_with_gemini(health_summary).await,
        }
    }
}

/// Find the span from the first `{` to the last `}` in model output.
///
/// Gemini does not always honor JSON-object mode and may surround the payload
/// with prose or code fences. This is a compatibility shim, not a parser: the
/// span is handed to `serde_json` as-is.
pub fn extract_json_object(content: &str) -> Option<&str> {
    JSON_OBJECT.find(content).map(|m| m.as_str())
}
