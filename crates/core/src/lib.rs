//! Shared primitives for all Rust crates in Lumora.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Lumora crates.
pub type AppResult<T> = Result<T, AppError>;

/// A single rejected input field with its path and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the offending field, e.g. `customerEmail` or `services`.
    pub path: String,
    /// Human-readable message describing the violation.
    pub message: String,
}

impl FieldError {
    /// Creates a field error from a path and message.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Collection of field-level violations produced by request validation.
///
/// Carried inside [`AppError::InvalidRequest`] so callers can highlight the
/// offending form inputs instead of showing one opaque message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Creates an empty violation list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Records one violation.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(path, message));
    }

    /// Returns whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded violations.
    #[must_use]
    pub fn as_slice(&self) -> &[FieldError] {
        self.0.as_slice()
    }

    /// Consumes the list and returns the recorded violations.
    #[must_use]
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl Display for FieldErrors {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(formatter, "; ")?;
            }
            write!(formatter, "{}: {}", error.path, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(value: Vec<FieldError>) -> Self {
        Self(value)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Request rejected with per-field violations.
    #[error("invalid request: {0}")]
    InvalidRequest(FieldErrors),

    /// Caller identity is missing or could not be verified.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Referenced resource exists but is not in a usable state.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, FieldErrors};

    #[test]
    fn field_errors_display_joins_entries() {
        let mut errors = FieldErrors::new();
        errors.push("customerName", "too short");
        errors.push("date", "must be YYYY-MM-DD");
        assert_eq!(
            errors.to_string(),
            "customerName: too short; date: must be YYYY-MM-DD"
        );
    }

    #[test]
    fn invalid_request_reports_field_paths() {
        let mut errors = FieldErrors::new();
        errors.push("time", "must be HH:MM");
        let error = AppError::InvalidRequest(errors);
        assert!(error.to_string().contains("time: must be HH:MM"));
    }

    #[test]
    fn empty_field_errors_reports_empty() {
        assert!(FieldErrors::new().is_empty());
    }
}
