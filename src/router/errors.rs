//! # Request Errors

use thiserror::Error;

use crate::keygen::KeyError;
use crate::observability::Severity;
use crate::store::StoreError;
use crate::table::TableError;

/// Result type for request handling
pub type RequestResult<T> = Result<T, RequestError>;

/// Everything that can fail a request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    MalformedInput(#[from] KeyError),

    #[error(transparent)]
    UnresolvableTopic(#[from] TableError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RequestError {
    /// Stable error code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::MalformedInput(e) => e.code().code(),
            RequestError::UnresolvableTopic(e) => e.code(),
            RequestError::Store(e) => e.code().code(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RequestError::MalformedInput(e) => e.severity(),
            RequestError::UnresolvableTopic(_) => Severity::Error,
            RequestError::Store(e) => e.severity(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
