//! Collaborator errors.

use thiserror::Error;

/// Failure reported by an external generator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered but the payload was unusable.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The collaborator is not configured or refused to serve.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}
