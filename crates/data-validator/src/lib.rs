//! Applicant Input Validation
//!
//! Turns the attribute mapping submitted by the presentation layer into a
//! typed `RawInput`, enforcing the ranges the core relies on its caller for.

mod error;
mod validator;

pub use error::{ValidationError, ValidationErrors, ValidationWarning};
pub use validator::{ValidatedInput, ValidationConfig, Validator, ATTRIBUTE_NAMES, MAX_AMOUNT};
