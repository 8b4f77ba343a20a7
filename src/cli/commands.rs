//! CLI command implementations
//!
//! Each command is split into a pure part that returns the response data
//! and a thin wrapper that reads stdin and writes stdout.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::config::Config;
use crate::keygen::KeyGenerator;
use crate::router::{Operation, Request, RequestRouter};
use crate::store::MemoryStore;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_body, read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures
/// are reported as an error response before being returned.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Handle { config, store } => handle(config.as_deref(), &store),
        Command::Key => key(),
        Command::Table {
            topic,
            per_topic,
            config,
        } => table(&topic, per_topic, config.as_deref()),
    }
}

/// Handle one request from stdin against a fixture file
pub fn handle(config_path: Option<&Path>, store_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let request = read_request()?;
    let data = handle_request(&config, store_path, &request)?;
    write_response(data)
}

/// Run `request` against the fixture at `store_path`.
///
/// Deletes write the resulting store back to the fixture; failed
/// requests leave the fixture untouched.
pub fn handle_request(config: &Config, store_path: &Path, request: &Request) -> CliResult<Value> {
    let store = MemoryStore::load_fixture(store_path)?;
    let router = RequestRouter::new(config, store.clone());

    let operation = request.operation();
    let value = router.handle(request)?;

    if operation != Operation::Get {
        store.save_fixture(store_path)?;
    }

    Ok(value_response(operation, value.as_deref()))
}

fn value_response(operation: Operation, value: Option<&[u8]>) -> Value {
    match value {
        Some(bytes) => json!({
            "operation": operation.as_str(),
            "found": true,
            "value": STANDARD.encode(bytes),
            "utf8": std::str::from_utf8(bytes).ok(),
        }),
        None => json!({
            "operation": operation.as_str(),
            "found": false,
            "value": Value::Null,
            "utf8": Value::Null,
        }),
    }
}

/// Derive and print the row key of a body read from stdin
pub fn key() -> CliResult<()> {
    let body = read_body()?;
    write_response(describe_key(&body)?)
}

/// Canonical form, hex row key and printable key of `body`.
pub fn describe_key(body: &[u8]) -> CliResult<Value> {
    let keys = KeyGenerator::new();
    let key = keys.generate_key(body)?;
    let checksum = key.checksum().map(|c| hex(&c)).unwrap_or_default();

    Ok(json!({
        "canonical": key.canonical(),
        "checksum": checksum,
        "row_key": hex(key.as_bytes()),
        "printable_key": keys.printable_key(&key),
    }))
}

/// Resolve and print the table a topic maps to
pub fn table(topic: &str, per_topic: bool, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    write_response(resolve_table(&config, topic, per_topic)?)
}

pub fn resolve_table(config: &Config, topic: &str, per_topic: bool) -> CliResult<Value> {
    let table = config.table_resolver().resolve(topic, per_topic)?;
    Ok(json!({ "topic": topic, "table": table }))
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::generate_key;
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            default_table: "data".to_string(),
            ..Config::default()
        }
    }

    fn seeded_fixture(dir: &TempDir) -> std::path::PathBuf {
        let config = config();
        let store = MemoryStore::new();
        let row = generate_key(b"{\"a\":1,\"b\":2}").unwrap();
        store.put("data", row.as_bytes(), &config.data_column(), 7, b"payload");
        let path = dir.path().join("store.json");
        store.save_fixture(&path).unwrap();
        path
    }

    #[test]
    fn test_handle_get_found() {
        let dir = TempDir::new().unwrap();
        let path = seeded_fixture(&dir);

        let data = handle_request(&config(), &path, &Request::get("db.x.y", "{\"b\":2,\"a\":1}", 0))
            .unwrap();
        assert_eq!(data["operation"], "GET");
        assert_eq!(data["found"], true);
        assert_eq!(data["value"], STANDARD.encode(b"payload"));
        assert_eq!(data["utf8"], "payload");
    }

    #[test]
    fn test_handle_get_missing_row() {
        let dir = TempDir::new().unwrap();
        let path = seeded_fixture(&dir);

        let data = handle_request(&config(), &path, &Request::get("db.x.y", "abc", 0)).unwrap();
        assert_eq!(data["found"], false);
        assert!(data["value"].is_null());
    }

    #[test]
    fn test_handle_drop_writes_fixture_back() {
        let dir = TempDir::new().unwrap();
        let path = seeded_fixture(&dir);

        let data = handle_request(&config(), &path, &Request::delete("db.x.y", true)).unwrap();
        assert_eq!(data["operation"], "DROP");
        assert_eq!(data["utf8"], "record");

        let reloaded = MemoryStore::load_fixture(&path).unwrap();
        assert!(!reloaded.has_table("data"));
    }

    #[test]
    fn test_handle_missing_fixture() {
        let dir = TempDir::new().unwrap();
        let err = handle_request(
            &config(),
            &dir.path().join("absent.json"),
            &Request::get("db.x.y", "abc", 0),
        )
        .unwrap_err();
        assert!(err.code_str().starts_with("CELLFETCH_STORE_"));
    }

    #[test]
    fn test_describe_key() {
        let data = describe_key(b"abc").unwrap();
        assert_eq!(data["canonical"], "{\"id\":\"abc\"}");
        assert_eq!(data["checksum"].as_str().unwrap().len(), 8);
        assert!(data["row_key"]
            .as_str()
            .unwrap()
            .starts_with(data["checksum"].as_str().unwrap()));
        assert!(data["printable_key"]
            .as_str()
            .unwrap()
            .ends_with("{\"id\":\"abc\"}"));
    }

    #[test]
    fn test_describe_key_malformed() {
        let err = describe_key(b"not json").unwrap_err();
        assert_eq!(err.code_str(), "CELLFETCH_MALFORMED_INPUT");
    }

    #[test]
    fn test_resolve_table() {
        let data = resolve_table(&config(), "db.my-ns.my-table", true).unwrap();
        assert_eq!(data["table"], "my_ns:my_table");

        let data = resolve_table(&config(), "db.my-ns.my-table", false).unwrap();
        assert_eq!(data["table"], "data");
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
