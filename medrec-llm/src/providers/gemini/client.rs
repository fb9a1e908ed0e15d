//! Gemini HTTP client

use super::types::ApiError;
use medrec_core::ExternalError;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};

const PROVIDER: &str = "gemini";

/// HTTP client for the Gemini generateContent API.
///
/// Each request carries its own timeout; a transport timeout is reported as
/// `ExternalError::Timeout` so callers can tell it apart from a bad reply.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// POST a request body to an endpoint path and parse the JSON reply.
    pub async fn request<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Req,
    ) -> Result<Res, ExternalError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let started = Instant::now();
        tracing::debug!(endpoint = %endpoint, "sending generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExternalError::Timeout {
                        provider: PROVIDER.to_string(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                } else {
                    ExternalError::ServiceFailed {
                        provider: PROVIDER.to_string(),
                        message: format!("HTTP request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ExternalError::ServiceFailed {
                provider: PROVIDER.to_string(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error_msg = if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                api_error.error.message
            } else {
                error_text
            };

            Err(ExternalError::ServiceFailed {
                provider: PROVIDER.to_string(),
                message: format!("{}: {}", status, error_msg),
            })
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
