//! Web API error types.

use thiserror::Error;

use crate::diagnostics::DiagnosticReport;

/// Result type for Web API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the data service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connect, body read).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status. Carries the full
    /// diagnostic so callers can log hints or decide to retry.
    #[error("service returned {}: {}", .0.status_code, .0.message)]
    Service(Box<DiagnosticReport>),

    /// The response body was not the JSON shape the endpoint documents.
    #[error("unexpected response shape from {url}: {detail}")]
    UnexpectedShape { url: String, detail: String },
}

impl ApiError {
    /// Whether retrying the request may succeed without intervention.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout() || err.is_connect(),
            Self::Service(report) => report.is_retriable(),
            Self::UnexpectedShape { .. } => false,
        }
    }

    /// The diagnostic report, when the failure came from the service.
    pub fn diagnostic(&self) -> Option<&DiagnosticReport> {
        match self {
            Self::Service(report) => Some(report),
            _ => None,
        }
    }
}
