//! Core `ModelGateway` trait and `GeminiGateway` implementation.
//!
//! `GeminiGateway` calls the Google AI `generateContent` endpoint with a
//! text prompt and an optional inline image. All connection details come
//! from [`GeminiConfig`]; nothing is hardcoded and nothing is read from the
//! environment here.
//!
//! The gateway is deliberately dumb: one synchronous call, no streaming, no
//! internal retry. Retry policy belongs to the session flow, which simply
//! re-invokes after the user asks again.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::media::EncodedImage;

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the generative endpoint.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key configured — the request would be rejected anyway.
    #[error("no API key configured for the model endpoint")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("model request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("model request timed out")]
    Timeout,

    /// The endpoint answered with a non-2xx status. `message` is the
    /// body's `error.message` when present, otherwise a generic string.
    #[error("model endpoint returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The response had no text at `candidates[0].content.parts[0].text`.
    /// Treated the same as a transport failure by callers.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ModelGateway trait
// ---------------------------------------------------------------------------

/// Async boundary to the generative-language service.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ModelGateway>`. Stateless — safe to invoke concurrently for
/// independent prompts, though a session only ever has one call in flight.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `prompt` (plus an optional inline image) and return the model's
    /// raw reply text.
    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&EncodedImage>,
    ) -> Result<String, GatewayError>;
}

// ---------------------------------------------------------------------------
// GeminiGateway
// ---------------------------------------------------------------------------

/// Calls `{base_url}/v1beta/models/{model}:generateContent`.
///
/// Request body:
/// `{ contents: [{ parts: [{ text }, { inlineData: { mimeType, data } }?] }] }`
/// Reply text is read from `candidates[0].content.parts[0].text`.
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Build a `GeminiGateway` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }

    /// Build the `contents` request body for a prompt and optional image.
    fn request_body(prompt: &str, image: Option<&EncodedImage>) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": prompt })];
        if let Some(img) = image {
            parts.push(serde_json::json!({
                "inlineData": {
                    "mimeType": img.mime_type,
                    "data": img.data,
                }
            }));
        }
        serde_json::json!({ "contents": [{ "parts": parts }] })
    }

    /// Pull the reply text out of a response body, if present.
    fn extract_text(body: &serde_json::Value) -> Option<String> {
        body.get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(|s| s.to_string())
    }

    /// Pull `error.message` out of a non-2xx body, if present.
    fn extract_error_message(body: &str) -> Option<String> {
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        json.get("error")?
            .get("message")?
            .as_str()
            .map(|s| s.to_string())
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(
        &self,
        prompt: &str,
        image: Option<&EncodedImage>,
    ) -> Result<String, GatewayError> {
        if self.config.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let body = Self::request_body(prompt, image);

        log::debug!(
            "gateway: invoking {} (prompt {} chars, image: {})",
            self.config.model,
            prompt.len(),
            image.is_some()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::extract_error_message(&body)
                .unwrap_or_else(|| "model endpoint request failed".into());
            log::warn!("gateway: {} -> {status}: {message}", self.config.model);
            return Err(GatewayError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let text = Self::extract_text(&json).ok_or(GatewayError::EmptyResponse)?;
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        log::debug!("gateway: reply {} chars", text.len());
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// MockGateway  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured reply without touching the
/// network.
#[cfg(test)]
pub struct MockGateway {
    reply: Result<String, fn() -> GatewayError>,
}

#[cfg(test)]
impl MockGateway {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
        }
    }

    /// Create a mock that always fails with the given error constructor.
    pub fn err(make: fn() -> GatewayError) -> Self {
        Self { reply: Err(make) }
    }
}

#[cfg(test)]
#[async_trait]
impl ModelGateway for MockGateway {
    async fn invoke(
        &self,
        _prompt: &str,
        _image: Option<&EncodedImage>,
    ) -> Result<String, GatewayError> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: api_key.into(),
            model: "gemini-2.0-flash".into(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _gateway = GeminiGateway::from_config(&make_config("key"));
    }

    /// Verify that `GeminiGateway` is object-safe (usable as `dyn ModelGateway`).
    #[test]
    fn gateway_is_object_safe() {
        let gateway: Box<dyn ModelGateway> =
            Box::new(GeminiGateway::from_config(&make_config("key")));
        drop(gateway);
    }

    #[tokio::test]
    async fn empty_api_key_fails_fast() {
        let gateway = GeminiGateway::from_config(&make_config(""));
        let err = gateway.invoke("hello", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    // -----------------------------------------------------------------------
    // Request body shape
    // -----------------------------------------------------------------------

    #[test]
    fn request_body_text_only() {
        let body = GeminiGateway::request_body("translate this", None);
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            serde_json::json!("translate this")
        );
        assert!(body["contents"][0]["parts"].get(1).is_none());
    }

    #[test]
    fn request_body_with_inline_image() {
        let img = EncodedImage {
            data: "aGVsbG8=".into(),
            mime_type: "image/jpeg".into(),
        };
        let body = GeminiGateway::request_body("what is in this image", Some(&img));

        let inline = &body["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(inline["mimeType"], serde_json::json!("image/jpeg"));
        assert_eq!(inline["data"], serde_json::json!("aGVsbG8="));
    }

    // -----------------------------------------------------------------------
    // Response extraction
    // -----------------------------------------------------------------------

    #[test]
    fn extract_text_happy_path() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "casa;house" } ] } }
            ]
        });
        assert_eq!(
            GeminiGateway::extract_text(&body).as_deref(),
            Some("casa;house")
        );
    }

    #[test]
    fn extract_text_missing_path_is_none() {
        assert!(GeminiGateway::extract_text(&serde_json::json!({})).is_none());
        assert!(
            GeminiGateway::extract_text(&serde_json::json!({ "candidates": [] })).is_none()
        );
        assert!(GeminiGateway::extract_text(&serde_json::json!({
            "candidates": [ { "content": { "parts": [] } } ]
        }))
        .is_none());
    }

    #[test]
    fn extract_error_message_from_structured_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(
            GeminiGateway::extract_error_message(body).as_deref(),
            Some("API key not valid")
        );
    }

    #[test]
    fn extract_error_message_from_garbage_is_none() {
        assert!(GeminiGateway::extract_error_message("<html>502</html>").is_none());
    }
}
