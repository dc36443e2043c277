//! Request-level errors
//!
//! Only these conditions reach the caller as errors. Everything that goes
//! wrong while compiling or running candidate code is folded into the
//! [`GradeReport`](crate::report::GradeReport) instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Problem {0} not found")]
    ProblemNotFound(i64),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Error-only response body, returned in place of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&GradeError> for ErrorResponse {
    fn from(err: &GradeError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
