//! Error types for the exchange-rate client and the controller.
//!
//! # Design
//! `ApiError` covers everything that can go wrong between building a pair
//! request and holding a validated `PairConversion`. The controller never
//! lets it escape: a failed conversion is folded into a `ConvertFailure`
//! stored on the state, which is what a presentation layer can show.

use serde::Serialize;
use thiserror::Error;

/// Errors produced by `RateClient` and by host-side transports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-200 status.
    #[error("HTTP {status}: {}", .error_type.as_deref().unwrap_or("no error type"))]
    Http {
        status: u16,
        error_type: Option<String>,
    },

    /// The body was not the JSON shape of a pair reply.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The reply decoded but `result` was not `"success"`.
    #[error("conversion rejected: result={result:?} error-type={error_type:?}")]
    Rejected {
        result: Option<String>,
        error_type: Option<String>,
    },

    /// `result` was `"success"` but `conversion_result` was absent.
    #[error("reply has no numeric conversion_result")]
    MissingConversionResult,

    /// Client configuration could not be assembled.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Category of a failed conversion, as kept on the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Http,
    Rejected,
    Malformed,
}

/// A conversion failure recorded for the current input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&ApiError> for ConvertFailure {
    fn from(err: &ApiError) -> Self {
        let kind = match err {
            ApiError::Transport(_) | ApiError::Config(_) => FailureKind::Transport,
            ApiError::Http { .. } => FailureKind::Http,
            ApiError::Rejected { .. } => FailureKind::Rejected,
            ApiError::Deserialization(_) | ApiError::MissingConversionResult => {
                FailureKind::Malformed
            }
        };
        ConvertFailure {
            kind,
            message: err.to_string(),
        }
    }
}
