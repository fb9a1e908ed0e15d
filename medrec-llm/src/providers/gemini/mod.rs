//! Gemini provider implementation
//!
//! Adapts the Gemini generateContent API to the GenerativeProvider trait.

pub mod client;
pub mod types;

pub use client::GeminiClient;

use crate::{Generation, GenerativeProvider};
use async_trait::async_trait;
use medrec_core::ExternalError;
use std::time::Duration;
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the Gemini provider.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables, with defaults for
    /// everything except the API key.
    ///
    /// - `MEDREC_GEMINI_API_KEY` (required)
    /// - `MEDREC_GEMINI_MODEL`
    /// - `MEDREC_GEMINI_BASE_URL`
    /// - `MEDREC_GEMINI_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ExternalError> {
        let api_key =
            std::env::var("MEDREC_GEMINI_API_KEY").map_err(|_| ExternalError::ServiceFailed {
                provider: "gemini".to_string(),
                message: "MEDREC_GEMINI_API_KEY not set".to_string(),
            })?;

        let mut config = Self::new(api_key);

        if let Ok(model) = std::env::var("MEDREC_GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("MEDREC_GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        config.timeout = Duration::from_secs(
            std::env::var("MEDREC_GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(config)
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Generative provider backed by the Gemini API.
pub struct GeminiProvider {
    client: GeminiClient,
    model: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: GeminiClient::new(config.api_key, config.base_url, config.timeout),
            model: config.model,
        }
    }

    pub fn from_env() -> Result<Self, ExternalError> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let content = response.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(""),
        )
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<Generation, ExternalError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                // Deterministic as far as the service allows; replies feed a
                // content-addressed cache.
                temperature: Some(0.0),
                max_output_tokens: None,
            }),
        };

        let endpoint = format!("models/{}:generateContent", self.model);
        let response: GenerateContentResponse = self.client.request(&endpoint, request).await?;

        let text = Self::extract_text(&response).ok_or_else(|| ExternalError::ServiceFailed {
            provider: "gemini".to_string(),
            message: "reply contained no candidates".to_string(),
        })?;

        Ok(Generation {
            text,
            model: self.model.clone(),
            tokens_used: response
                .usage_metadata
                .and_then(|u| u.total_token_count),
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
