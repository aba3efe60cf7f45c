use std::fmt;

use docdiff_text::ExtractionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a change classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The service asked the caller to slow down. Retrying is the caller's call.
    #[error("rate limited by classification service: {0}")]
    RateLimited(String),
    /// The service rejected the request (size, content, or model mismatch).
    #[error("classification request rejected: {0}")]
    BadRequest(String),
    /// The request never completed (connect, timeout, or body read failure).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service answered with an error status.
    #[error("classification service error ({status}): {message}")]
    Service { status: u16, message: String },
    /// The response body is not JSON.
    #[error("classification response is not valid JSON: {0}")]
    InvalidJson(String),
    /// The response is JSON but not the expected block list.
    #[error("classification response violates schema: {0}")]
    SchemaViolation(String),
}

/// Which input document an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSide {
    Original,
    Revised,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::Original => f.write_str("1"),
            DocumentSide::Revised => f.write_str("2"),
        }
    }
}

/// Coarse failure category reported alongside every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Extraction,
    Preprocessing,
    Oracle,
    Rendering,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::Preprocessing => "preprocessing",
            ErrorKind::Oracle => "oracle",
            ErrorKind::Rendering => "rendering",
        }
    }
}

/// Fatal failure of one comparison. A comparison either succeeds fully or
/// fails with exactly one of these.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("error in document {side}: {source}")]
    Extraction {
        side: DocumentSide,
        #[source]
        source: ExtractionError,
    },
    #[error("text preprocessing failed: {0}")]
    Preprocessing(String),
    #[error("classification of chunk pair {} failed: {source}", .pair + 1)]
    Oracle {
        pair: usize,
        #[source]
        source: OracleError,
    },
    #[error("result rendering failed: {0}")]
    Rendering(String),
}

impl CompareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompareError::Extraction { .. } => ErrorKind::Extraction,
            CompareError::Preprocessing(_) => ErrorKind::Preprocessing,
            CompareError::Oracle { .. } => ErrorKind::Oracle,
            CompareError::Rendering(_) => ErrorKind::Rendering,
        }
    }
}

impl From<fmt::Error> for CompareError {
    fn from(err: fmt::Error) -> Self {
        CompareError::Rendering(err.to_string())
    }
}
