//! CLI module for cellfetch
//!
//! Provides command-line interface for:
//! - handle: Run one request against a fixture-backed store
//! - key: Derive the row key of a message body
//! - table: Resolve the table a topic maps to

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    describe_key, handle, handle_request, key, resolve_table, run, run_command, table,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{
    read_body, read_body_from, read_request, read_request_from, write_error, write_error_to,
    write_response, write_response_to,
};
