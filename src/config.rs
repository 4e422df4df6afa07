//! Process-wide run configuration: credential, endpoint and model.
//!
//! Built once at startup from the environment and passed explicitly, never
//! held as ambient global state. No telemetry is emitted anywhere.

use async_openai::{Client, config::OpenAIConfig};

use crate::error::AppError;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_BASE_VAR: &str = "QUESTWEAVER_API_BASE";
pub const MODEL_VAR: &str = "QUESTWEAVER_MODEL";

/// Gemini's OpenAI-compatible chat completions endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

// No Debug derive: the api key must not leak through error or log output.
#[derive(Clone)]
pub struct GameConfig {
    api_key: String,
    pub api_base: String,
    pub model: String,
}

impl GameConfig {
    /// Read the configuration from the environment.
    ///
    /// The API credential is required; startup fails before any session is
    /// served when it is missing. Endpoint and model have defaults and can
    /// be overridden for other OpenAI-compatible backends.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::MissingApiKey)?;

        let api_base =
            std::env::var(API_BASE_VAR).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = std::env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            api_base,
            model,
        })
    }

    #[cfg(test)]
    pub fn for_tests(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build the shared chat completions client for this configuration.
    pub fn client(&self) -> Client<OpenAIConfig> {
        // async-openai appends "/chat/completions" itself; a trailing slash
        // in the base would produce a double-slash path.
        let base = self.api_base.trim_end_matches('/');
        Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&self.api_key)
                .with_api_base(base),
        )
    }
}
