//! Shared primitives for all Rust crates in soxguard.

#![forbid(unsafe_code)]

/// Control-plane failure diagnostics.
pub mod remote;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use remote::RemoteRequestFailure;

/// Result type used across soxguard crates.
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

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bearer token acquisition failed. No HTTP request was sent.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The HTTP call could not complete and no status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The control plane answered with a non-success status.
    #[error("remote request failed: {0}")]
    RemoteRequest(Box<RemoteRequestFailure>),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns remote failure diagnostics when this error came from a non-2xx response.
    #[must_use]
    pub fn remote_failure(&self) -> Option<&RemoteRequestFailure> {
        match self {
            Self::RemoteRequest(failure) => Some(failure.as_ref()),
            _ => None,
        }
    }
}

impl From<RemoteRequestFailure> for AppError {
    fn from(value: RemoteRequestFailure) -> Self {
        Self::RemoteRequest(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, RemoteRequestFailure};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn remote_request_error_exposes_diagnostics() {
        let error = AppError::from(RemoteRequestFailure::new(
            "PUT",
            "https://management.azure.com/x",
            409,
            "{\"error\":\"conflict\"}",
            Some("{\"properties\":{}}".to_owned()),
        ));

        let failure = error.remote_failure();
        assert_eq!(failure.map(RemoteRequestFailure::status), Some(409));
        assert_eq!(
            failure.and_then(RemoteRequestFailure::request_body),
            Some("{\"properties\":{}}")
        );
        assert!(error.to_string().contains("returned status 409"));
    }

    #[test]
    fn unauthorized_is_not_a_remote_failure() {
        let error = AppError::Unauthorized("token endpoint unreachable".to_owned());
        assert!(error.remote_failure().is_none());
    }
}
