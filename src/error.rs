//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling attendance,
//! resolving salaries, calculating tax, and driving payroll runs.

use thiserror::Error;

/// The broad category of a [`PayrollError`].
///
/// Callers (such as the HTTP layer) branch on the kind instead of matching
/// on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input was malformed or violated a simple rule.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// A uniqueness rule was violated.
    Conflict,
    /// The entity is not in the status the requested action requires.
    InvalidStateTransition,
    /// A required piece of configuration is missing.
    Unprocessable,
    /// The engine's own configuration could not be loaded.
    Configuration,
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::{ErrorKind, PayrollError};
///
/// let error = PayrollError::NotFound {
///     entity: "payroll run",
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "payroll run not found: 42");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Input data was invalid.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The field or argument that was invalid.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// An entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
        /// The key that was looked up.
        id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflicting record.
        message: String,
    },

    /// The requested action is not allowed from the entity's current status.
    #[error("{message}")]
    InvalidStateTransition {
        /// The violated precondition.
        message: String,
    },

    /// A prerequisite configuration is missing.
    #[error("Unprocessable: {message}")]
    Unprocessable {
        /// A description of the missing prerequisite.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl PayrollError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PayrollError::Validation { .. } => ErrorKind::Validation,
            PayrollError::NotFound { .. } => ErrorKind::NotFound,
            PayrollError::Conflict { .. } => ErrorKind::Conflict,
            PayrollError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            PayrollError::Unprocessable { .. } => ErrorKind::Unprocessable,
            PayrollError::ConfigNotFound { .. } | PayrollError::ConfigParseError { .. } => {
                ErrorKind::Configuration
            }
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PayrollError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        PayrollError::Conflict {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_transition(message: impl Into<String>) -> Self {
        PayrollError::InvalidStateTransition {
            message: message.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PayrollError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
