use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing or decoding lending model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A value violates one of the model invariants.
    #[error("invalid {field}: {reason}")]
    InvalidModel { field: &'static str, reason: String },

    /// Wire data could not be decoded into the schema.
    #[error("malformed input at line {line} column {column}: {reason}")]
    MalformedInput {
        reason: String,
        line: usize,
        column: usize,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidModel {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_model(&self) -> bool {
        matches!(self, ModelError::InvalidModel { .. })
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, ModelError::MalformedInput { .. })
    }

    /// Field that failed validation, if the error came from a constructor.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ModelError::InvalidModel { field, .. } => Some(*field),
            ModelError::MalformedInput { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        let line = err.line();
        let column = err.column();
        // serde_json appends the position to its message; keep it out of `reason`
        let mut reason = err.to_string();
        let suffix = format!(" at line {} column {}", line, column);
        if reason.ends_with(&suffix) {
            reason.truncate(reason.len() - suffix.len());
        }

        ModelError::MalformedInput {
            reason,
            line,
            column,
        }
    }
}

/// Error body handed back to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ModelError> for ErrorResponse {
    fn from(err: &ModelError) -> Self {
        ErrorResponse {
            error: err.to_string(),
        }
    }
}
