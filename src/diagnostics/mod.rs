//! Diagnostic translation for failed Web API responses.
//!
//! A failed HTTP response is turned into a structured [`DiagnosticReport`]:
//! status line, the error code and message from the body when it parses,
//! correlation and rate-limit headers when present, and a set of
//! human-readable hints synthesized from message patterns. Translation never
//! fails; a response with an empty or unparseable body still yields a report
//! with whatever could be determined.

mod hints;

pub use hints::synthesize_hints;

use std::fmt;
use std::time::SystemTime;

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Response headers that carry the service-side request identifier.
const REQUEST_ID_HEADERS: &[&str] = &["x-ms-service-request-id", "request-id"];

/// Response headers that carry the client correlation identifier.
const CORRELATION_ID_HEADERS: &[&str] = &["x-ms-correlation-request-id", "client-request-id"];

/// Remaining-request and window headers for the service rate limiter.
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ms-ratelimit-burst-remaining-xrm-requests";
const RATE_LIMIT_WINDOW_HEADER: &str = "x-ms-ratelimit-time-remaining-xrm-requests";

/// Rate-limit state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateLimitState {
    /// Requests remaining in the current window.
    pub remaining: u64,
    /// Seconds until the window resets.
    pub window_seconds: u64,
}

/// Structured description of a failed response.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// HTTP status code.
    pub status_code: u16,
    /// Canonical status text ("Not Found", "Too Many Requests", ...).
    pub status_text: String,
    /// Error code from the response body, when the body parsed.
    pub error_code: Option<String>,
    /// Error message: the body's message when it parsed, the status text otherwise.
    pub message: String,
    /// Human-readable suggestions derived from the message. Every matching
    /// rule contributes one hint.
    pub hints: Vec<String>,
    /// Correlation identifier echoed by the service.
    pub correlation_id: Option<String>,
    /// Service-side request identifier.
    pub request_id: Option<String>,
    /// Rate-limit state, when the service reported one.
    pub rate_limit: Option<RateLimitState>,
    /// The URL that was requested, when known.
    pub url: Option<String>,
    /// The raw body, kept as context when it could not be parsed.
    pub raw_body: Option<String>,
    /// When the response was translated.
    pub timestamp: SystemTime,
}

impl DiagnosticReport {
    /// Whether retrying the request may succeed without intervention.
    pub fn is_retriable(&self) -> bool {
        if self.status_code == 429 || self.status_code >= 500 {
            return true;
        }
        matches!(self.rate_limit, Some(limit) if limit.remaining == 0)
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status_code, self.status_text, self.message)?;
        if let Some(url) = &self.url {
            write!(f, " [{url}]")?;
        }
        for hint in &self.hints {
            write!(f, "\n  hint: {hint}")?;
        }
        if let Some(id) = &self.request_id {
            write!(f, "\n  request id: {id}")?;
        }
        if let Some(id) = &self.correlation_id {
            write!(f, "\n  correlation id: {id}")?;
        }
        if let Some(limit) = &self.rate_limit {
            write!(
                f,
                "\n  rate limit: {} requests remaining, window resets in {}s",
                limit.remaining, limit.window_seconds
            )?;
        }
        Ok(())
    }
}

/// Translate a failed [`reqwest::Response`] into a [`DiagnosticReport`].
///
/// Consumes the response to read its body. A body that cannot be read is
/// treated as empty rather than surfaced as an error.
pub async fn describe_response(response: Response, requested_url: Option<&str>) -> DiagnosticReport {
    let status = response.status();
    let headers = response.headers().clone();
    let url = requested_url
        .map(str::to_string)
        .unwrap_or_else(|| response.url().to_string());
    let body = response.text().await.unwrap_or_default();
    describe(status, &headers, &body, Some(&url))
}

/// Translate the parts of a failed response into a [`DiagnosticReport`].
pub fn describe(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    requested_url: Option<&str>,
) -> DiagnosticReport {
    let status_text = status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string();

    let (error_code, message, raw_body) = match parse_error_body(body) {
        Some((code, message)) => (code, message, None),
        None if body.trim().is_empty() => (None, status_text.clone(), None),
        // Unparseable body: keep it as context instead of discarding it.
        None => (None, status_text.clone(), Some(body.to_string())),
    };

    // Hints pattern-match whatever text we have, parsed or raw.
    let searchable = raw_body.as_deref().unwrap_or(&message);
    let hints = synthesize_hints(status, searchable);

    let report = DiagnosticReport {
        status_code: status.as_u16(),
        status_text,
        error_code,
        message,
        hints,
        correlation_id: first_header(headers, CORRELATION_ID_HEADERS),
        request_id: first_header(headers, REQUEST_ID_HEADERS),
        rate_limit: rate_limit_state(headers),
        url: requested_url.map(str::to_string),
        raw_body,
        timestamp: SystemTime::now(),
    };
    debug!(status = report.status_code, hints = report.hints.len(), "translated failed response");
    report
}

/// Extract `code` and `message` from an OData error body.
///
/// Returns `None` when the body is not a JSON object with an `error` member.
fn parse_error_body(body: &str) -> Option<(Option<String>, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let code = error
        .get("code")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let message = error.get("message").and_then(Value::as_str)?.to_string();
    Some((code, message))
}

fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

fn rate_limit_state(headers: &HeaderMap) -> Option<RateLimitState> {
    let remaining = header_u64(headers, RATE_LIMIT_REMAINING_HEADER)?;
    let window_seconds = header_u64(headers, RATE_LIMIT_WINDOW_HEADER).unwrap_or(0);
    Some(RateLimitState {
        remaining,
        window_seconds,
    })
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
