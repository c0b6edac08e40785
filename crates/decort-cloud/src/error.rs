//! Controller client error types

use decort_config::{Authenticator, ConfigError};
use thiserror::Error;

/// Upper bound on how much of a failing response body is kept.
pub const BODY_PREVIEW_LIMIT: usize = 512;

/// Errors surfaced by session construction and dispatcher calls
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("invalid provider configuration: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("{mode} authentication failed: {reason}")]
    AuthFailed { mode: Authenticator, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("controller returned HTTP {code} for {url}")]
    UpstreamStatus {
        code: u16,
        url: String,
        body_preview: String,
    },

    #[error("controller session is not configured")]
    NotConfigured,

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`CloudError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigInvalid,
    AuthFailed,
    TransportFailure,
    UpstreamStatus,
    NotConfigured,
    Decode,
}

impl CloudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
            CloudError::AuthFailed { .. } => ErrorKind::AuthFailed,
            CloudError::Transport(_) => ErrorKind::TransportFailure,
            CloudError::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            CloudError::NotConfigured => ErrorKind::NotConfigured,
            CloudError::Json(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status of an [`CloudError::UpstreamStatus`]
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::UpstreamStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn auth(mode: Authenticator, reason: impl Into<String>) -> Self {
        CloudError::AuthFailed {
            mode,
            reason: reason.into(),
        }
    }
}

/// Cut `body` to at most [`BODY_PREVIEW_LIMIT`] bytes on a char boundary.
pub(crate) fn body_preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

pub type Result<T> = std::result::Result<T, CloudError>;
