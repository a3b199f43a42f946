//! Error types for modelmap operations.

use std::fmt;

/// The primary error type for schema resolution and condition compilation.
///
/// All failures are deterministic given the same inputs, so none of these
/// are retryable. Resolution errors abort the enclosing schema resolution
/// entirely; compilation errors abort only the fragment being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input to schema resolution was not a structured record.
    InvalidShape {
        /// Description of what was actually supplied.
        actual: String,
    },
    /// A named field lookup against a resolved schema found nothing.
    FieldNotFound {
        /// The model the lookup ran against.
        model: &'static str,
        /// The name that failed to resolve.
        field: String,
    },
    /// Explicit foreign-key and association-foreign-key override lists
    /// had mismatched lengths.
    InvalidRelationship {
        /// The model owning the relationship field.
        model: &'static str,
        /// The relationship field.
        field: String,
        message: String,
    },
    /// Primary-key lookup on a shape with no annotated key and no `id`
    /// fallback.
    NoPrimaryKey {
        /// The model without a usable primary key.
        model: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidShape { actual } => {
                write!(f, "invalid shape: {} is not a record type", actual)
            }
            Error::FieldNotFound { model, field } => {
                write!(f, "field '{}' not found on model '{}'", field, model)
            }
            Error::InvalidRelationship {
                model,
                field,
                message,
            } => {
                write!(
                    f,
                    "invalid relationship on '{}.{}': {}",
                    model, field, message
                )
            }
            Error::NoPrimaryKey { model } => {
                write!(f, "model '{}' has no primary key", model)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for modelmap operations.
pub type Result<T> = std::result::Result<T, Error>;
