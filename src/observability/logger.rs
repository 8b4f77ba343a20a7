//! Structured JSON-lines logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then `ts`, then fields sorted by key
//! - Synchronous, no buffering
//! - Every line goes to stderr; stdout belongs to the CLI response

use std::fmt;
use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// The invocation cannot continue
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that writes one JSON object per line.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        #[cfg(test)]
        {
            let captured = CAPTURED.with(|captured| match captured.borrow_mut().as_mut() {
                Some(lines) => {
                    let mut buffer = Vec::new();
                    Self::log_to_writer(severity, event, fields, &mut buffer);
                    lines.push(String::from_utf8_lossy(&buffer).into_owned());
                    true
                }
                None => false,
            });
            if captured {
                return;
            }
        }

        Self::log_to_writer(severity, event, fields, &mut io::stderr().lock());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = Self::render(severity, event, &ts, fields);

        // Logging must never take the invocation down with it.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn render(severity: Severity, event: &str, ts: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(256);

        output.push('{');
        output.push_str("\"event\":");
        Self::push_json_string(&mut output, event);
        output.push_str(",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push_str("\",\"ts\":");
        Self::push_json_string(&mut output, ts);

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push(',');
            Self::push_json_string(&mut output, key);
            output.push(':');
            Self::push_json_string(&mut output, value);
        }

        output.push_str("}\n");
        output
    }

    fn push_json_string(output: &mut String, s: &str) {
        match serde_json::to_string(s) {
            Ok(quoted) => output.push_str(&quoted),
            Err(_) => output.push_str("\"\""),
        }
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    /// Log at FATAL level
    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

#[cfg(test)]
thread_local! {
    static CAPTURED: std::cell::RefCell<Option<Vec<String>>> = const { std::cell::RefCell::new(None) };
}

/// Run `f` and return every line this thread logged meanwhile, instead of
/// writing them to stderr.
#[cfg(test)]
pub fn capture_lines<F: FnOnce()>(f: F) -> Vec<String> {
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    f();
    CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default())
}

/// Capture a log line into a string for assertions.
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_capture_lines_collects_this_thread() {
        let lines = capture_lines(|| {
            Logger::info("FIRST", &[]);
            Logger::fatal("SECOND", &[("reason", "x")]);
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"event\":\"FIRST\""));
        assert!(lines[1].contains("\"severity\":\"FATAL\""));

        // Capture ends with the closure.
        assert!(capture_lines(|| {}).is_empty());
    }

    #[test]
    fn test_log_line_is_json() {
        let output = capture_log(Severity::Info, "REQUEST_RECEIVED", &[("input_topic", "db.a.b")]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "REQUEST_RECEIVED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["input_topic"], "db.a.b");
        assert!(parsed["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_fields_sorted_after_header() {
        let line = Logger::render(
            Severity::Info,
            "TEST",
            "2026-01-01T00:00:00.000Z",
            &[("zebra", "1"), ("apple", "2"), ("mango", "3")],
        );

        assert_eq!(
            line,
            "{\"event\":\"TEST\",\"severity\":\"INFO\",\"ts\":\"2026-01-01T00:00:00.000Z\",\
             \"apple\":\"2\",\"mango\":\"3\",\"zebra\":\"1\"}\n"
        );
    }

    #[test]
    fn test_log_escapes_quotes_and_control_chars() {
        let output = capture_log(
            Severity::Warn,
            "TEST",
            &[("printable_key", "\\x01\\xab{\"a\":1}\u{0}\nline2")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["printable_key"], "\\x01\\xab{\"a\":1}\u{0}\nline2");
        assert_eq!(output.matches('\n').count(), 1);
    }
}
