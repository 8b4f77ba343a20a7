//! Key derivation error types
//!
//! Error codes:
//! - CELLFETCH_MALFORMED_INPUT (ERROR severity)

use std::fmt;

use crate::observability::Severity;

/// Key derivation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyErrorCode {
    /// Body is neither an identifier nor valid JSON
    MalformedInput,
}

impl KeyErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            KeyErrorCode::MalformedInput => "CELLFETCH_MALFORMED_INPUT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            KeyErrorCode::MalformedInput => Severity::Error,
        }
    }
}

impl fmt::Display for KeyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Key derivation error
#[derive(Debug)]
pub struct KeyError {
    code: KeyErrorCode,
    message: String,
    details: Option<String>,
    source: Option<serde_json::Error>,
}

impl KeyError {
    /// The body parsed as neither an identifier nor JSON.
    pub fn invalid_json(body: &str, source: serde_json::Error) -> Self {
        Self {
            code: KeyErrorCode::MalformedInput,
            message: "Cannot parse invalid JSON".to_string(),
            details: Some(format!("message_body: {}", body)),
            source: Some(source),
        }
    }

    /// The body bytes are not UTF-8.
    pub fn invalid_utf8(valid_up_to: usize) -> Self {
        Self {
            code: KeyErrorCode::MalformedInput,
            message: "Message body is not valid UTF-8".to_string(),
            details: Some(format!("byte_offset: {}", valid_up_to)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> KeyErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for key derivation
pub type KeyResult<T> = Result<T, KeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_code() {
        assert_eq!(KeyErrorCode::MalformedInput.code(), "CELLFETCH_MALFORMED_INPUT");
        assert_eq!(KeyErrorCode::MalformedInput.severity(), Severity::Error);
    }

    #[test]
    fn test_invalid_json_display() {
        let source = serde_json::from_str::<serde_json::Value>("{\"a\":").unwrap_err();
        let err = KeyError::invalid_json("{\"a\":", source);
        let display = err.to_string();
        assert!(display.contains("CELLFETCH_MALFORMED_INPUT"));
        assert!(display.contains("Cannot parse invalid JSON"));
        assert!(display.contains("message_body"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_utf8_has_offset() {
        let err = KeyError::invalid_utf8(3);
        assert_eq!(err.details(), Some("byte_offset: 3"));
        assert_eq!(err.message(), "Message body is not valid UTF-8");
    }
}
