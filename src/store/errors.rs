//! Store access error types
//!
//! Error codes:
//! - CELLFETCH_STORE_CONNECTION_FAILED (FATAL)
//! - CELLFETCH_STORE_READ_FAILED (FATAL)
//! - CELLFETCH_STORE_WRITE_FAILED (FATAL)
//! - CELLFETCH_STORE_ADMIN_FAILED (FATAL)
//! - CELLFETCH_STORE_FIXTURE_INVALID (ERROR)
//!
//! Store failures end the invocation. Nothing here is retried; retry and
//! backoff belong to the client underneath the connector.

use std::fmt;
use std::io;

use crate::observability::Severity;

/// Store error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Connection could not be established or was refused
    ConnectionFailed,
    /// Get or scan failed
    ReadFailed,
    /// Cell deletion failed
    WriteFailed,
    /// Disable, delete or truncate failed
    AdminFailed,
    /// Fixture file unreadable or malformed
    FixtureInvalid,
}

impl StoreErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::ConnectionFailed => "CELLFETCH_STORE_CONNECTION_FAILED",
            StoreErrorCode::ReadFailed => "CELLFETCH_STORE_READ_FAILED",
            StoreErrorCode::WriteFailed => "CELLFETCH_STORE_WRITE_FAILED",
            StoreErrorCode::AdminFailed => "CELLFETCH_STORE_ADMIN_FAILED",
            StoreErrorCode::FixtureInvalid => "CELLFETCH_STORE_FIXTURE_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::FixtureInvalid => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with table context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    table: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table: None,
            source: None,
        }
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ConnectionFailed, message)
    }

    pub fn read_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ReadFailed, message)
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::WriteFailed, message)
    }

    pub fn admin_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::AdminFailed, message)
    }

    /// Fixture could not be read from or written to disk
    pub fn fixture_io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::FixtureInvalid, message)
        }
    }

    /// Fixture content is malformed
    pub fn fixture_invalid(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::FixtureInvalid, message)
    }

    /// Attach the table the failing operation addressed
    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table the error relates to, if known
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Whether the invocation must stop
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref table) = self.table {
            write!(f, " (hbase_table_name: {})", table)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_fatal() {
        assert!(StoreError::connection_failed("refused").is_fatal());
        assert!(StoreError::read_failed("timeout").is_fatal());
        assert!(StoreError::write_failed("rejected").is_fatal());
        assert!(StoreError::admin_failed("table in use").is_fatal());
    }

    #[test]
    fn test_fixture_errors_are_not_fatal() {
        assert!(!StoreError::fixture_invalid("bad base64").is_fatal());
    }

    #[test]
    fn test_display_includes_code_and_table() {
        let err = StoreError::admin_failed("table is not disabled").for_table("ns:t");
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("CELLFETCH_STORE_ADMIN_FAILED"));
        assert!(display.contains("table is not disabled"));
        assert!(display.contains("hbase_table_name: ns:t"));
        assert_eq!(err.table(), Some("ns:t"));
    }

    #[test]
    fn test_fixture_io_keeps_source() {
        let err = StoreError::fixture_io(
            "cannot read fixture",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
