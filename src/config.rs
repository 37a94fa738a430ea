//! Configuration loader for the `vitals-insight` service and client.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, net::SocketAddr};

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional port environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable, falling back to a default.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Read an optional secret; empty values count as unset.
macro_rules! optional_env {
    ($var_name:expr) => {
        env::var($var_name).ok().filter(|v| !v.trim().is_empty())
    };
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Connection details for one OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    // ---
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,

    /// Bearer token; requests are sent unauthenticated when absent.
    pub api_key: Option<String>,

    /// Model name sent with every request.
    pub model: String,
}

/// Strongly typed server configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Port the HTTP server listens on (all interfaces).
    pub port: u16,

    /// OpenAI endpoint.
    pub openai: ProviderConfig,

    /// Gemini endpoint (OpenAI-compatible surface).
    pub gemini: ProviderConfig,

    /// Completion token ceiling for analysis requests.
    pub max_tokens: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `PORT` – listen port (default: 8080)
/// - `AI_INTEGRATIONS_OPENAI_API_KEY`, `AI_INTEGRATIONS_OPENAI_BASE_URL`, `OPENAI_MODEL`
/// - `AI_INTEGRATIONS_GEMINI_API_KEY`, `AI_INTEGRATIONS_GEMINI_BASE_URL`, `GEMINI_MODEL`
/// - `LLM_MAX_TOKENS` – completion token ceiling (default: 1000)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let port = parse_env_u16!("PORT", 8080);
    let max_tokens = parse_env_u32!("LLM_MAX_TOKENS", 1000);

    let openai = ProviderConfig {
        base_url: env_or!("AI_INTEGRATIONS_OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
        api_key: optional_env!("AI_INTEGRATIONS_OPENAI_API_KEY"),
        model: env_or!("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
    };

    let gemini = ProviderConfig {
        base_url: env_or!("AI_INTEGRATIONS_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        api_key: optional_env!("AI_INTEGRATIONS_GEMINI_API_KEY"),
        model: env_or!("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
    };

    Ok(Config {
        port,
        openai,
        gemini,
        max_tokens,
    })
}

impl Config {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// API keys are masked; everything else is shown as loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  PORT            : {}", self.port);
        tracing::info!("  OPENAI_BASE_URL : {}", self.openai.base_url);
        tracing::info!("  OPENAI_MODEL    : {}", self.openai.model);
        tracing::info!("  OPENAI_API_KEY  : {}", mask_secret(self.openai.api_key.as_deref()));
        tracing::info!("  GEMINI_BASE_URL : {}", self.gemini.base_url);
        tracing::info!("  GEMINI_MODEL    : {}", self.gemini.model);
        tracing::info!("  GEMINI_API_KEY  : {}", mask_secret(self.gemini.api_key.as_deref()));
        tracing::info!("  LLM_MAX_TOKENS  : {}", self.max_tokens);
    }
}

/// Client-side configuration: where the analysis API lives and where the
/// local health store is kept.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // ---
    /// Base URL of the analysis service.
    pub api_url: String,

    /// SQLite connection string for the local store.
    pub store_url: String,

    /// Maximum number of store connections.
    pub store_pool_max: u32,
}

/// Load client configuration from environment variables with defaults.
///
/// Optional:
/// - `HEALTH_API_URL` – analysis service base URL (default: `http://localhost:8080`)
/// - `HEALTH_STORE_URL` – SQLite URL (default: `sqlite://health.db?mode=rwc`)
/// - `HEALTH_STORE_POOL_MAX` – max store connections (default: 1)
pub fn load_client_from_env() -> Result<ClientConfig> {
    // ---
    let api_url = env_or!("HEALTH_API_URL", "http://localhost:8080");
    let store_url = env_or!("HEALTH_STORE_URL", "sqlite://health.db?mode=rwc");
    let store_pool_max = parse_env_u32!("HEALTH_STORE_POOL_MAX", 1);

    Ok(ClientConfig {
        api_url,
        store_url,
        store_pool_max,
    })
}

/// Show only the last four characters of a secret.
fn mask_secret(secret: Option<&str>) -> String {
    // ---
    match secret {
        None => "<unset>".to_string(),
        Some(s) if s.chars().count() <= 4 => "****".to_string(),
        Some(s) => {
            let start = s.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
            format!("****{}", &s[start..])
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_mask_secret() {
        // ---
        assert_eq!(mask_secret(None), "<unset>");
        assert_eq!(mask_secret(Some("abc")), "****");
        assert_eq!(mask_secret(Some("sk-1234567890")), "****7890");
    }

    #[test]
    fn test_bind_addr_uses_all_interfaces() {
        // ---
        let cfg = Config {
            port: 9090,
            openai: ProviderConfig {
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                api_key: None,
                model: DEFAULT_OPENAI_MODEL.to_string(),
            },
            gemini: ProviderConfig {
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                api_key: None,
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
            max_tokens: 1000,
        };
        assert_eq!(cfg.bind_addr().to_string(), "0.0.0.0:9090");
    }
}
