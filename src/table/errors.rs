//! # Table Resolution Errors

use thiserror::Error;

/// Result type for table resolution
pub type TableResult<T> = Result<T, TableError>;

/// Table resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Could not parse table name from topic: '{0}'")]
    UnresolvableTopic(String),
}

impl TableError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::UnresolvableTopic(_) => "CELLFETCH_UNRESOLVABLE_TOPIC",
        }
    }
}
