//! Shared primitives for all Rust crates in Spacewarden.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Spacewarden crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A resource carries a creation time that is not an RFC 3339 instant.
    #[error("malformed creation timestamp '{value}' on {resource}: {reason}")]
    MalformedTimestamp {
        /// Kind and identifier of the offending resource.
        resource: String,
        /// Raw value received from the platform.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Listing organizations, spaces, applications or instances failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Deleting a space or an application failed.
    #[error("delete error: {0}")]
    Delete(String),

    /// Mail transport failure.
    #[error("notification error: {0}")]
    Notification(String),

    /// Notification template could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
