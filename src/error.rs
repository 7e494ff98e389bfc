//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Each variant says what went wrong and where, which lets the batch
//! orchestrator downgrade per-lesson failures to a status label while
//! configuration failures stay fatal.

use crate::model::{JobStatus, OutcomeStatus};
use crate::types::GenerationId;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// How the generation service answered, judged from the HTTP status alone.
///
/// Retry decisions are made on this vocabulary instead of raw numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx: the body carries the answer
    Success,
    /// 429: back off and retry
    RateLimited,
    /// 5xx: the service is struggling, back off and retry
    ServerError,
    /// Any other status: the request itself was refused
    Rejected,
}

impl ResponseClass {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else if status.is_server_error() {
            Self::ServerError
        } else {
            Self::Rejected
        }
    }

    /// Whether this response is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

impl fmt::Display for ResponseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ServerError => write!(f, "server_error"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Generation service rejected the request (HTTP {status}): {body}")]
    Submission { status: StatusCode, body: String },

    #[error("Generation response did not include a job identifier: {body}")]
    MissingIdentifier { body: String },

    #[error("Still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// `body` is the complete status payload; the message shows a preview.
    #[error("Generation {id} failed: {}", crate::api::preview_body(body))]
    GenerationFailed { id: GenerationId, body: String },

    #[error("Generation {id} did not finish after {attempts} status checks")]
    PollTimeout {
        id: GenerationId,
        attempts: u32,
        /// The last status check was answered with a throttle.
        throttled: bool,
    },

    #[error("Generation {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: GenerationId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Batch manifest error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template render error for template {name}: {message}")]
    TemplateRenderError { name: String, message: String },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether this error should stop the whole run rather than one lesson.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingConfiguration(_))
    }

    /// The job this error concerns, when the service had already assigned one.
    pub fn generation_id(&self) -> Option<&GenerationId> {
        match self {
            Self::GenerationFailed { id, .. }
            | Self::PollTimeout { id, .. }
            | Self::InvalidTransition { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The status label a lesson receives when its generation ends with this error.
    pub fn outcome_status(&self) -> OutcomeStatus {
        match self {
            Self::GenerationFailed { .. } => OutcomeStatus::Failed,
            Self::RateLimited { .. } => OutcomeStatus::Throttled,
            Self::PollTimeout {
                throttled: true, ..
            } => OutcomeStatus::Throttled,
            Self::PollTimeout { .. } => OutcomeStatus::TimedOut,
            _ => OutcomeStatus::Rejected,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
