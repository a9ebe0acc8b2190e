//! Validation Error Types

use std::fmt;
use thiserror::Error;

/// Errors during input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value has the wrong JSON type
    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// Binary code other than 0 or 1, or an unknown label for it
    #[error("{field} has invalid value {value}")]
    InvalidCode { field: &'static str, value: String },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl ValidationError {
    /// Field the error refers to, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::WrongType { field, .. }
            | ValidationError::InvalidCode { field, .. }
            | ValidationError::MissingField(field) => Some(*field),
            ValidationError::InvalidFormat(_) => None,
        }
    }
}

/// Every error found in one input
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

/// Non-fatal findings; the input is still usable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Label not in the attribute's closed set, encoded as the reference level
    UnknownCategory {
        field: &'static str,
        value: String,
        fallback: &'static str,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::UnknownCategory {
                field,
                value,
                fallback,
            } => write!(f, "{field} '{value}' is not a known category, treated as '{fallback}'"),
        }
    }
}
