//! Raw HTTP client for the Gemini `generateContent` API.
//!
//! No orchestration awareness — just makes API calls via reqwest. The
//! underlying connection handle is constructed once per process and shared
//! across every attempt; it is never mutated after first use, so no locking
//! is involved.

use std::sync::OnceLock;

use reqwest::Client;

use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Errors from remote calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The process-wide HTTP connection handle, built on first use.
fn shared_http() -> &'static Client {
    static HTTP: OnceLock<Client> = OnceLock::new();
    HTTP.get_or_init(Client::new)
}

/// Raw HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client with the default base URL.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.into())
    }

    /// Create a client with a custom base URL (for testing with mock servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: shared_http().clone(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint URL for a model. The key travels as a query parameter.
    fn endpoint_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            model,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Request a single completion from the given model.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint_url(model))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ClientError::RateLimited { retry_after });
        }

        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(ClientError::Api {
                status,
                message: body,
            });
        }

        let resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(resp)
    }
}
