//! JSON I/O handling for CLI
//!
//! - Input: one request JSON object, or one raw message body, on stdin
//! - Output: one JSON object on stdout
//! - Readers and writers are generic so commands can be driven in tests

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::router::Request;

/// Read a request from stdin
pub fn read_request() -> CliResult<Request> {
    read_request_from(io::stdin().lock())
}

/// Read a request object from `reader`.
pub fn read_request_from<R: Read>(mut reader: R) -> CliResult<Request> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    serde_json::from_str(&input)
        .map_err(|e| CliError::invalid_request(format!("Invalid request: {}", e)))
}

/// Read a raw message body from stdin
pub fn read_body() -> CliResult<Vec<u8>> {
    read_body_from(io::stdin().lock())
}

/// Read a raw message body from `reader`. One trailing line ending is
/// stripped so `echo <id> | cellfetch key` sees the identifier alone.
pub fn read_body_from<R: Read>(mut reader: R) -> CliResult<Vec<u8>> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;

    if body.ends_with(b"\n") {
        body.pop();
        if body.ends_with(b"\r") {
            body.pop();
        }
    }
    Ok(body)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(io::stdout().lock(), data)
}

pub fn write_response_to<W: Write>(writer: W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(writer, &response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(io::stdout().lock(), code, message)
}

pub fn write_error_to<W: Write>(writer: W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(writer, &response)
}

fn write_line<W: Write>(mut writer: W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
