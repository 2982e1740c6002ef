//! Translation client — one remote attempt per call, outcome classified.
//!
//! `Translator` wraps the raw Gemini client with prompt construction and
//! failure classification. It holds no session state and never propagates
//! an error past its boundary: every outcome, success or failure, comes
//! back as a `TranslationResult` value.

pub mod client;
pub mod prompt;
pub mod types;

use tracing::{debug, warn};

use crate::lang::Language;
use client::{ClientError, GeminiClient};
use types::GenerateContentRequest;

/// Shown when the API key is absent. Persistent until the environment is fixed.
pub const MISSING_KEY_MESSAGE: &str =
    "Configuration error: GEMINI_API_KEY is not set in the environment.";

/// Shown when the service reports quota exhaustion or too many requests.
pub const RATE_LIMITED_MESSAGE: &str = "The service is not available.";

/// Shown for any other failed attempt.
pub const TRANSIENT_MESSAGE: &str = "Translation failed. Please try again.";

/// Why an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The access credential is absent; no retry can help.
    MissingConfiguration,
    /// The service is shedding load; the caller should not immediately retry.
    RateLimited,
    /// Anything else; retrying may succeed.
    TransientFailure,
}

/// A classified failure with its stable user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One translation attempt's input. Built fresh per attempt, immutable.
/// `polite` is meaningful only for targets with a formality register and
/// must be `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
    pub polite: Option<bool>,
}

/// One attempt's outcome. When `error` is present, consumers treat `text`
/// as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    pub error: Option<ErrorDescriptor>,
}

impl TranslationResult {
    /// Trivial success with no output.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            error: None,
        }
    }

    fn ok(text: &str) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    fn failure(error: ErrorDescriptor) -> Self {
        Self {
            text: String::new(),
            error: Some(error),
        }
    }
}

/// Stateless translation front door. Owns the model name and, when a
/// credential is configured, the remote client.
#[derive(Debug)]
pub struct Translator {
    client: Option<GeminiClient>,
    model: String,
}

impl Translator {
    /// Create a translator; `api_key: None` means every real attempt will
    /// report `MissingConfiguration` without touching the network.
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        Self {
            client: api_key.map(GeminiClient::new),
            model: model.into(),
        }
    }

    /// Create a translator reading the key from the environment.
    pub fn from_env(model: &str) -> Self {
        Self::new(crate::config::api_key_from_env(), model)
    }

    /// Create a translator against a custom base URL (for testing).
    pub fn with_base_url(api_key: String, model: &str, base_url: String) -> Self {
        Self {
            client: Some(GeminiClient::with_base_url(api_key, base_url)),
            model: model.into(),
        }
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }

    /// The model used for completions.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Perform one translation attempt and classify its outcome.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        if request.text.trim().is_empty() {
            return TranslationResult::empty();
        }

        let Some(client) = &self.client else {
            return TranslationResult::failure(ErrorDescriptor::new(
                ErrorKind::MissingConfiguration,
                MISSING_KEY_MESSAGE,
            ));
        };

        let instruction = prompt::build_instruction(request);
        let wire = GenerateContentRequest::from_text(&instruction);

        debug!(
            source = %request.source,
            target = %request.target,
            chars = request.text.chars().count(),
            "issuing translation attempt"
        );

        match client.generate(&self.model, &wire).await {
            // Empty model output is a valid (if unhelpful) success.
            Ok(response) => TranslationResult::ok(response.text().unwrap_or("").trim()),
            Err(err) => {
                warn!("translation attempt failed: {err}");
                TranslationResult::failure(classify(&err))
            }
        }
    }
}

/// Map a client error onto the user-facing taxonomy. Rate-limit conditions
/// are recognized by the transport status or by well-known markers in the
/// lowered error text; everything else is transient.
fn classify(err: &ClientError) -> ErrorDescriptor {
    const RATE_LIMIT_MARKERS: [&str; 4] =
        ["429", "quota", "resource_exhausted", "too many requests"];

    if matches!(err, ClientError::RateLimited { .. }) {
        return ErrorDescriptor::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE);
    }

    let lowered = err.to_string().to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ErrorDescriptor::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE)
    } else {
        ErrorDescriptor::new(ErrorKind::TransientFailure, TRANSIENT_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.into(),
            source: Language::English,
            target: Language::Korean,
            polite: Some(true),
        }
    }

    /// Serve exactly one canned HTTP response on a loopback port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Drain the request: headers, then content-length worth of body.
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(header_end) = find(&buf, b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                    let body_len = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + body_len {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });

        format!("http://{addr}")
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[tokio::test]
    async fn empty_input_is_trivial_success_without_network() {
        // An unroutable base URL: any network attempt would fail loudly.
        let translator =
            Translator::with_base_url("key".into(), "m", "http://127.0.0.1:1".into());
        for text in ["", "   ", "\n\t "] {
            let result = translator.translate(&request(text)).await;
            assert_eq!(result, TranslationResult::empty());
        }
    }

    #[tokio::test]
    async fn missing_credential_fails_fast() {
        let translator = Translator::new(None, "m");
        assert!(!translator.has_credential());

        let result = translator.translate(&request("Hello")).await;
        assert_eq!(result.text, "");
        let err = result.error.unwrap();
        assert_eq!(err.kind, ErrorKind::MissingConfiguration);
        assert_eq!(err.message, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn successful_attempt_trims_model_output() {
        let base = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"  안녕하세요\n"}]},"finishReason":"STOP"}]}"#,
        )
        .await;
        let translator = Translator::with_base_url("key".into(), "m", base);

        let result = translator.translate(&request("Hello")).await;
        assert_eq!(result.error, None);
        assert_eq!(result.text, "안녕하세요");
    }

    #[tokio::test]
    async fn empty_model_output_is_still_success() {
        let base = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"   "}]},"finishReason":"STOP"}]}"#,
        )
        .await;
        let translator = Translator::with_base_url("key".into(), "m", base);

        let result = translator.translate(&request("Hello")).await;
        assert_eq!(result, TranslationResult::empty());
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited() {
        let base = serve_once("429 Too Many Requests", r#"{"error":{"code":429}}"#).await;
        let translator = Translator::with_base_url("key".into(), "m", base);

        let err = translator.translate(&request("Hello")).await.error.unwrap();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.message, RATE_LIMITED_MESSAGE);
    }

    #[tokio::test]
    async fn quota_marker_in_error_body_maps_to_rate_limited() {
        let base = serve_once(
            "500 Internal Server Error",
            r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .await;
        let translator = Translator::with_base_url("key".into(), "m", base);

        let err = translator.translate(&request("Hello")).await.error.unwrap();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn other_failures_map_to_transient() {
        let base = serve_once("500 Internal Server Error", r#"{"error":{}}"#).await;
        let translator = Translator::with_base_url("key".into(), "m", base);

        let err = translator.translate(&request("Hello")).await.error.unwrap();
        assert_eq!(err.kind, ErrorKind::TransientFailure);
        assert_eq!(err.message, TRANSIENT_MESSAGE);
    }

    #[tokio::test]
    async fn connection_failure_maps_to_transient() {
        let translator =
            Translator::with_base_url("key".into(), "m", "http://127.0.0.1:1".into());

        let err = translator.translate(&request("Hello")).await.error.unwrap();
        assert_eq!(err.kind, ErrorKind::TransientFailure);
    }

    #[test]
    fn classification_priority() {
        let rate_limited = classify(&ClientError::RateLimited { retry_after: None });
        assert_eq!(rate_limited.kind, ErrorKind::RateLimited);

        let api_429 = classify(&ClientError::Api {
            status: 429,
            message: "slow down".into(),
        });
        assert_eq!(api_429.kind, ErrorKind::RateLimited);

        let quota = classify(&ClientError::Api {
            status: 403,
            message: "Quota exceeded for this project".into(),
        });
        assert_eq!(quota.kind, ErrorKind::RateLimited);

        let other = classify(&ClientError::InvalidResponse("truncated".into()));
        assert_eq!(other.kind, ErrorKind::TransientFailure);
        assert_eq!(other.message, TRANSIENT_MESSAGE);
    }
}
