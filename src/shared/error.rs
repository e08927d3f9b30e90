//! Shared Error Types
//!
//! This module defines error types for failures that are not tied to a
//! particular storage adapter or to the HTTP layer: malformed keys, bad
//! route names and JSON documents that do not have the expected shape.
//!
//! # Error Categories
//!
//! - `ValidationError` - Data validation failures
//!
//! # Usage
//!
//! ```rust
//! use storefront_layout::shared::error::SharedError;
//!
//! let error = SharedError::validation("mode", "expected 'lg' or 'sm'");
//! ```
use thiserror::Error;

/// Error types shared by the storage, layout and HTTP layers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("route", "route name cannot be empty");
        let SharedError::ValidationError { field, message } = error;
        assert_eq!(field, "route");
        assert_eq!(message, "route name cannot be empty");
    }

    #[test]
    fn test_error_display() {
        let error = SharedError::validation("mode", "unknown mode");
        let display = format!("{}", error);
        assert!(display.contains("'mode'"));
        assert!(display.contains("unknown mode"));
    }
}
