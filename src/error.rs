//! Error type for calls against the review backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend call.
///
/// Load paths turn these into placeholder states and mutation paths turn
/// them into notices; nothing above the session sees them as fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response envelope carried no data: {0}")]
    MissingData(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// `true` when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Rejected { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Human-readable text suitable for a notice body.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}
