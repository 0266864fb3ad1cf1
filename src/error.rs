//! Query error taxonomy
//!
//! Three failure kinds reach the caller. Only `InvalidDataset` is the
//! client's fault; the other two are server faults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// `code` is not one of the known datasets
    #[error("Invalid code type. Valid types: {valid}")]
    InvalidDataset { code: String, valid: String },

    /// Dataset file absent, unreadable, or not shaped as `{ <code>: [...] }`
    #[error("Invalid data format in JSON file: {reason}")]
    MalformedSource { code: String, reason: String },

    /// Anything else that went wrong while answering the query
    #[error("{message}")]
    Unhandled { code: String, message: String },
}

impl QueryError {
    /// The dataset code the failing request attempted
    pub fn code(&self) -> &str {
        match self {
            QueryError::InvalidDataset { code, .. }
            | QueryError::MalformedSource { code, .. }
            | QueryError::Unhandled { code, .. } => code,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidDataset { .. })
    }

    pub(crate) fn malformed(code: &str, reason: impl Into<String>) -> Self {
        QueryError::MalformedSource {
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}
