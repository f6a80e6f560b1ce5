//! Deck-backend submission client with ordered route fallback.
//!
//! The direct backend endpoint is frequently unreachable from restrictive
//! networks, so delivery runs through an ordered strategy list: the direct
//! URL first, then each configured relay prefix prepended to it. Routes are
//! tried in order and the first one that returns a non-empty success body
//! wins; earlier failures are logged and superseded. Only when every route
//! fails does the caller see an error — the most recent one.
//!
//! The backend has shipped two success shapes over time (a raw `.apkg`
//! binary, and JSON `{ success, download_url }`); both are accepted and
//! surfaced as an [`Artifact`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::submit::payload::SubmissionPayload;

// ---------------------------------------------------------------------------
// SubmissionError
// ---------------------------------------------------------------------------

/// Failure classification, derived from the transport status/code — never
/// guessed from error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    /// HTTP 400 — the backend rejected the payload.
    BadRequest,
    /// HTTP 413 — the vocabulary list is too large.
    PayloadTooLarge,
    /// HTTP 429 — rate limited.
    RateLimited,
    /// HTTP 5xx.
    Server,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection could not be established.
    NetworkUnreachable,
    /// Anything else (unexpected status, empty body, serialisation).
    Unknown,
}

/// Error returned when every route has failed; carries the most recent
/// underlying failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    /// Human-presentable message. When the backend embeds a structured
    /// error body, that message takes precedence over the generic one for
    /// the classification.
    pub message: String,
}

impl SubmissionError {
    fn new(kind: SubmissionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify an HTTP status, preferring `structured` (the backend's
    /// embedded `error`/`message` field) for the message text.
    fn from_status(status: u16, structured: Option<String>) -> Self {
        let (kind, generic) = match status {
            400 => (
                SubmissionErrorKind::BadRequest,
                "Bad request: please check the provided vocabulary.",
            ),
            413 => (
                SubmissionErrorKind::PayloadTooLarge,
                "The vocabulary list is too large.",
            ),
            429 => (
                SubmissionErrorKind::RateLimited,
                "Too many requests. Please wait and try again.",
            ),
            500..=599 => (
                SubmissionErrorKind::Server,
                "The server encountered an error. Please try again later.",
            ),
            _ => (SubmissionErrorKind::Unknown, "Unexpected server response."),
        };
        Self::new(kind, structured.unwrap_or_else(|| generic.to_string()))
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(
                SubmissionErrorKind::Timeout,
                "The request timed out. Please try again.",
            )
        } else if e.is_connect() {
            Self::new(
                SubmissionErrorKind::NetworkUnreachable,
                "Network error: the server might be down or unreachable.",
            )
        } else {
            Self::new(SubmissionErrorKind::Unknown, e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome / Artifact
// ---------------------------------------------------------------------------

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// The generated deck package, returned inline as binary.
    Package(Vec<u8>),
    /// A URL to retrieve the generated deck from.
    Locator(String),
}

/// Terminal result of a submission, carried by the session's result state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub deck_name: String,
    pub artifact: Artifact,
}

// ---------------------------------------------------------------------------
// DeckBackend trait
// ---------------------------------------------------------------------------

/// Async boundary to the deck-building service, so the session flow can be
/// tested against an in-process double.
#[async_trait]
pub trait DeckBackend: Send + Sync {
    /// Serialise `payload` once and deliver it through the route list.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<Outcome, SubmissionError>;
}

// ---------------------------------------------------------------------------
// SubmissionClient
// ---------------------------------------------------------------------------

/// Posts the payload to the deck backend, falling back through relays.
pub struct SubmissionClient {
    client: reqwest::Client,
    routes: Vec<String>,
}

impl SubmissionClient {
    /// Build a client from application config. The route list is fixed at
    /// construction: the direct URL first, then each relay prefix
    /// prepended to it, in config order.
    pub fn from_config(config: &BackendConfig) -> Self {
        let routes = build_routes(&config.base_url, &config.relay_prefixes);
        Self::with_routes(routes, config.timeout_secs)
    }

    /// Build a client with an explicit route list — used by tests to point
    /// the fallback chain at mock endpoints.
    pub fn with_routes(routes: Vec<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, routes }
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    /// One delivery attempt against one route.
    async fn try_route(&self, route: &str, body: &[u8]) -> Result<Artifact, SubmissionError> {
        let response = self
            .client
            .post(route)
            .header("content-type", "application/json")
            .header("x-requested-with", "XMLHttpRequest")
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        if !status.is_success() {
            let structured = extract_structured_message(&bytes);
            return Err(SubmissionError::from_status(status.as_u16(), structured));
        }

        parse_success_body(&content_type, bytes)
    }
}

#[async_trait]
impl DeckBackend for SubmissionClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<Outcome, SubmissionError> {
        // Serialise once; every route attempt reuses the same bytes.
        let body = serde_json::to_vec(payload).map_err(|e| {
            SubmissionError::new(SubmissionErrorKind::Unknown, format!("payload encoding: {e}"))
        })?;

        log::debug!(
            "submit: deck {:?}, {} cards, {} routes",
            payload.deck_name,
            payload.card_count(),
            self.routes.len()
        );

        let body = &body;
        let artifact = try_routes(&self.routes, |route| async move {
            self.try_route(&route, body).await
        })
        .await?;

        Ok(Outcome {
            deck_name: payload.deck_name.clone(),
            artifact,
        })
    }
}

// ---------------------------------------------------------------------------
// Route helpers
// ---------------------------------------------------------------------------

/// Direct URL first, then each relay prefix prepended to it.
fn build_routes(base_url: &str, relay_prefixes: &[String]) -> Vec<String> {
    std::iter::once(base_url.to_string())
        .chain(relay_prefixes.iter().map(|p| format!("{p}{base_url}")))
        .collect()
}

/// Evaluate `attempt` against each route in order, returning the first
/// success. Every failure is logged; when all routes fail, the *last*
/// failure is returned (earlier ones are superseded).
async fn try_routes<F, Fut>(
    routes: &[String],
    mut attempt: F,
) -> Result<Artifact, SubmissionError>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<Artifact, SubmissionError>>,
{
    let mut last_error: Option<SubmissionError> = None;

    for route in routes {
        match attempt(route.clone()).await {
            Ok(artifact) => {
                log::debug!("submit: route {route} succeeded");
                return Ok(artifact);
            }
            Err(e) => {
                log::warn!("submit: route {route} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        SubmissionError::new(SubmissionErrorKind::Unknown, "no submission routes configured")
    }))
}

// ---------------------------------------------------------------------------
// Response-shape helpers
// ---------------------------------------------------------------------------

/// Interpret a 2xx body. The backend contract has varied: either the deck
/// package itself (octet-stream) or JSON `{ success, download_url }` —
/// both are supported. An empty body means the route did not really
/// succeed and the next one should be tried.
fn parse_success_body(content_type: &str, bytes: Vec<u8>) -> Result<Artifact, SubmissionError> {
    if bytes.is_empty() {
        return Err(SubmissionError::new(
            SubmissionErrorKind::Unknown,
            "empty response body",
        ));
    }

    if content_type.contains("application/json") {
        let json: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            SubmissionError::new(SubmissionErrorKind::Unknown, format!("malformed response: {e}"))
        })?;

        if json.get("success").and_then(|v| v.as_bool()) == Some(true) {
            let url = json
                .get("download_url")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    SubmissionError::new(
                        SubmissionErrorKind::Unknown,
                        "success response without a download URL",
                    )
                })?;
            return Ok(Artifact::Locator(url.to_string()));
        }

        // JSON with success != true on a 2xx status: the backend is
        // reporting a payload problem in-band.
        let message = extract_structured_message(&bytes)
            .unwrap_or_else(|| "the backend rejected the deck".into());
        return Err(SubmissionError::new(SubmissionErrorKind::BadRequest, message));
    }

    Ok(Artifact::Package(bytes))
}

/// Pull `error` or `message` out of a JSON error body, if there is one.
fn extract_structured_message(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    json.get("error")
        .or_else(|| json.get("message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// MockDeckBackend  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records the submitted payload and returns a canned
/// result.
#[cfg(test)]
pub struct MockDeckBackend {
    result: Result<Artifact, SubmissionError>,
    pub submitted: std::sync::Mutex<Vec<SubmissionPayload>>,
}

#[cfg(test)]
impl MockDeckBackend {
    pub fn ok(artifact: Artifact) -> Self {
        Self {
            result: Ok(artifact),
            submitted: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn err(error: SubmissionError) -> Self {
        Self {
            result: Err(error),
            submitted: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl DeckBackend for MockDeckBackend {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<Outcome, SubmissionError> {
        self.submitted.lock().unwrap().push(payload.clone());
        match &self.result {
            Ok(artifact) => Ok(Outcome {
                deck_name: payload.deck_name.clone(),
                artifact: artifact.clone(),
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn net_err() -> SubmissionError {
        SubmissionError::new(
            SubmissionErrorKind::NetworkUnreachable,
            "Network error: the server might be down or unreachable.",
        )
    }

    // -----------------------------------------------------------------------
    // Route list construction
    // -----------------------------------------------------------------------

    #[test]
    fn routes_are_direct_then_relays_in_order() {
        let routes = build_routes(
            "https://backend/api/convert",
            &["https://relay-a/?".into(), "https://relay-b/raw?url=".into()],
        );
        assert_eq!(
            routes,
            [
                "https://backend/api/convert",
                "https://relay-a/?https://backend/api/convert",
                "https://relay-b/raw?url=https://backend/api/convert",
            ]
        );
    }

    #[test]
    fn from_config_builds_route_list() {
        let config = BackendConfig::default();
        let client = SubmissionClient::from_config(&config);
        assert_eq!(client.routes().len(), 1 + config.relay_prefixes.len());
        assert_eq!(client.routes()[0], config.base_url);
    }

    #[test]
    fn no_relays_means_direct_only() {
        let routes = build_routes("https://backend/api", &[]);
        assert_eq!(routes, ["https://backend/api"]);
    }

    // -----------------------------------------------------------------------
    // Ordered fallback (driven through try_routes)
    // -----------------------------------------------------------------------

    /// A and B fail with network errors, C returns a body → success using
    /// C's body; A/B failures are not surfaced.
    #[tokio::test]
    async fn first_successful_route_wins() {
        let routes: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
        let result = try_routes(&routes, |route| async move {
            match route.as_str() {
                "C" => Ok(Artifact::Package(b"deck-bytes".to_vec())),
                _ => Err(net_err()),
            }
        })
        .await;

        assert_eq!(result, Ok(Artifact::Package(b"deck-bytes".to_vec())));
    }

    /// Once a route succeeds, later routes must not be attempted.
    #[tokio::test]
    async fn fallback_short_circuits_on_success() {
        let routes: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
        let attempted = std::sync::Mutex::new(Vec::new());

        let _ = try_routes(&routes, |route| {
            attempted.lock().unwrap().push(route.clone());
            async move {
                match route.as_str() {
                    "A" => Err(net_err()),
                    _ => Ok(Artifact::Package(vec![1])),
                }
            }
        })
        .await;

        assert_eq!(*attempted.lock().unwrap(), ["A", "B"]);
    }

    /// All routes fail, last failure is HTTP 429 → the returned error is
    /// rate-limited (the most recent failure supersedes the others).
    #[tokio::test]
    async fn all_routes_fail_returns_last_error() {
        let routes: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
        let result = try_routes(&routes, |route| async move {
            match route.as_str() {
                "C" => Err(SubmissionError::from_status(429, None)),
                _ => Err(net_err()),
            }
        })
        .await;

        assert_eq!(result.unwrap_err().kind, SubmissionErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn empty_route_list_is_unknown_error() {
        let result = try_routes(&[], |_route| async move {
            Ok(Artifact::Package(vec![]))
        })
        .await;
        assert_eq!(result.unwrap_err().kind, SubmissionErrorKind::Unknown);
    }

    // -----------------------------------------------------------------------
    // Status classification
    // -----------------------------------------------------------------------

    #[test]
    fn status_codes_map_to_kinds() {
        let cases = [
            (400, SubmissionErrorKind::BadRequest),
            (413, SubmissionErrorKind::PayloadTooLarge),
            (429, SubmissionErrorKind::RateLimited),
            (500, SubmissionErrorKind::Server),
            (503, SubmissionErrorKind::Server),
            (302, SubmissionErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(SubmissionError::from_status(status, None).kind, kind);
        }
    }

    /// A structured error body replaces the generic message but never the
    /// status-derived classification.
    #[test]
    fn structured_message_overrides_text_not_kind() {
        let err = SubmissionError::from_status(400, Some("deck_name missing".into()));
        assert_eq!(err.kind, SubmissionErrorKind::BadRequest);
        assert_eq!(err.message, "deck_name missing");
    }

    #[test]
    fn extract_structured_message_reads_error_and_message_fields() {
        assert_eq!(
            extract_structured_message(br#"{"error": "bad vocab"}"#).as_deref(),
            Some("bad vocab")
        );
        assert_eq!(
            extract_structured_message(br#"{"message": "try later"}"#).as_deref(),
            Some("try later")
        );
        assert!(extract_structured_message(b"<html>oops</html>").is_none());
    }

    // -----------------------------------------------------------------------
    // Success-body shapes
    // -----------------------------------------------------------------------

    #[test]
    fn octet_stream_body_is_package() {
        let artifact =
            parse_success_body("application/octet-stream", b"PK\x03\x04deck".to_vec()).unwrap();
        assert_eq!(artifact, Artifact::Package(b"PK\x03\x04deck".to_vec()));
    }

    #[test]
    fn untyped_body_is_package() {
        let artifact = parse_success_body("", b"binary".to_vec()).unwrap();
        assert_eq!(artifact, Artifact::Package(b"binary".to_vec()));
    }

    #[test]
    fn json_success_with_locator() {
        let body = br#"{"success": true, "download_url": "https://backend/decks/42.apkg"}"#;
        let artifact = parse_success_body("application/json", body.to_vec()).unwrap();
        assert_eq!(
            artifact,
            Artifact::Locator("https://backend/decks/42.apkg".into())
        );
    }

    #[test]
    fn json_success_without_locator_is_error() {
        let body = br#"{"success": true}"#;
        let err = parse_success_body("application/json", body.to_vec()).unwrap_err();
        assert_eq!(err.kind, SubmissionErrorKind::Unknown);
    }

    #[test]
    fn json_in_band_failure_is_bad_request_with_message() {
        let body = br#"{"success": false, "error": "vocabulary empty"}"#;
        let err = parse_success_body("application/json", body.to_vec()).unwrap_err();
        assert_eq!(err.kind, SubmissionErrorKind::BadRequest);
        assert_eq!(err.message, "vocabulary empty");
    }

    #[test]
    fn empty_success_body_fails_the_route() {
        let err = parse_success_body("application/octet-stream", Vec::new()).unwrap_err();
        assert_eq!(err.kind, SubmissionErrorKind::Unknown);
    }
}
