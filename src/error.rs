use thiserror::Error;

/// Errors raised by the recommendation engine.
///
/// Per-field parse failures are never errors; they are coerced by the
/// call site (see [`crate::algo::parse`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgronomyError {
    /// A reference table is empty or malformed. Raised when the table is
    /// built, not per classification.
    #[error("Invalid reference table: {message}")]
    Configuration { message: String },

    /// The input cannot be scored, e.g. every numeric feature is missing.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Failed to read table '{path}': {message}")]
    TableRead { path: String, message: String },
}

impl AgronomyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn table_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TableRead {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgronomyError>;
