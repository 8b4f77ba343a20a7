//! CLI-specific error types
//!
//! Every failure surfaces as a code and a message in the error response.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::keygen::KeyError;
use crate::router::RequestError;
use crate::store::StoreError;
use crate::table::TableError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or environment error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Request JSON did not match the request shape
    InvalidRequest,
    /// Request failed; carries the underlying code
    RequestFailed(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CELLFETCH_CLI_CONFIG_ERROR",
            Self::IoError => "CELLFETCH_CLI_IO_ERROR",
            Self::InvalidRequest => "CELLFETCH_CLI_INVALID_REQUEST",
            Self::RequestFailed(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<RequestError> for CliError {
    fn from(e: RequestError) -> Self {
        Self::new(CliErrorCode::RequestFailed(e.code()), e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        RequestError::from(e).into()
    }
}

impl From<KeyError> for CliError {
    fn from(e: KeyError) -> Self {
        RequestError::from(e).into()
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        RequestError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_keeps_underlying_code() {
        let err: CliError = TableError::UnresolvableTopic("a.b".to_string()).into();
        assert_eq!(err.code_str(), "CELLFETCH_UNRESOLVABLE_TOPIC");
        assert_eq!(err.message(), "Could not parse table name from topic: 'a.b'");
    }

    #[test]
    fn test_display() {
        let err = CliError::io_error("Empty input");
        assert_eq!(err.to_string(), "CELLFETCH_CLI_IO_ERROR: Empty input");
    }
}
