//! JSON fixtures for [`MemoryStore`]
//!
//! ```json
//! {
//!   "tables": {
//!     "ns:table": {
//!       "enabled": true,
//!       "rows": [
//!         { "row": "<base64>",
//!           "cells": [ { "family": "cf", "qualifier": "record",
//!                        "timestamp": 1, "value": "<base64>" } ] }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Row keys and values are binary, so both are base64 (standard alphabet).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::connection::Column;
use super::errors::{StoreError, StoreResult};
use super::memory::{MemoryStore, MemoryTable};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Fixture {
    #[serde(default)]
    tables: BTreeMap<String, FixtureTable>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FixtureTable {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    rows: Vec<FixtureRow>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
struct FixtureRow {
    row: String,
    #[serde(default)]
    cells: Vec<FixtureCell>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FixtureCell {
    family: String,
    qualifier: String,
    timestamp: u64,
    value: String,
}

fn decode(field: &str, encoded: &str) -> StoreResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| StoreError::fixture_invalid(format!("{} is not base64: {}", field, e)))
}

impl MemoryStore {
    /// Builds a store from fixture JSON text.
    pub fn from_fixture_str(json: &str) -> StoreResult<Self> {
        let fixture: Fixture = serde_json::from_str(json)
            .map_err(|e| StoreError::fixture_invalid(format!("invalid fixture JSON: {}", e)))?;

        let store = MemoryStore::new();
        {
            let mut state = store.lock();
            for (name, table) in fixture.tables {
                let mut memory_table = MemoryTable {
                    enabled: table.enabled,
                    rows: BTreeMap::new(),
                };
                for row in table.rows {
                    let key = decode("row", &row.row)?;
                    let cells = memory_table.rows.entry(key).or_default();
                    for cell in row.cells {
                        let column = Column::new(cell.family, cell.qualifier);
                        cells
                            .entry(column)
                            .or_default()
                            .insert(cell.timestamp, decode("value", &cell.value)?);
                    }
                }
                state.tables.insert(name, memory_table);
            }
        }
        Ok(store)
    }

    /// Renders the current contents as fixture JSON.
    pub fn to_fixture_string(&self) -> StoreResult<String> {
        let state = self.lock();
        let mut fixture = Fixture::default();

        for (name, table) in &state.tables {
            let rows = table
                .rows
                .iter()
                .map(|(key, cells)| FixtureRow {
                    row: STANDARD.encode(key),
                    cells: cells
                        .iter()
                        .flat_map(|(column, versions)| {
                            versions.iter().map(move |(ts, value)| FixtureCell {
                                family: String::from_utf8_lossy(&column.family).into_owned(),
                                qualifier: String::from_utf8_lossy(&column.qualifier)
                                    .into_owned(),
                                timestamp: *ts,
                                value: STANDARD.encode(value),
                            })
                        })
                        .collect(),
                })
                .collect();

            fixture.tables.insert(
                name.clone(),
                FixtureTable {
                    enabled: table.enabled,
                    rows,
                },
            );
        }

        serde_json::to_string_pretty(&fixture)
            .map_err(|e| StoreError::fixture_invalid(format!("cannot render fixture: {}", e)))
    }

    /// Loads a store from a fixture file.
    pub fn load_fixture(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::fixture_io(format!("Failed to read fixture: {}", path.display()), e)
        })?;
        Self::from_fixture_str(&content)
    }

    /// Writes the current contents back to a fixture file.
    pub fn save_fixture(&self, path: &Path) -> StoreResult<()> {
        let content = self.to_fixture_string()?;
        fs::write(path, content).map_err(|e| {
            StoreError::fixture_io(format!("Failed to write fixture: {}", path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "tables": {
            "ns:t": {
                "rows": [
                    { "row": "AAAAAHJvdw==",
                      "cells": [ { "family": "cf", "qualifier": "record",
                                   "timestamp": 7, "value": "aGVsbG8=" } ] }
                ]
            },
            "ns:off": { "enabled": false }
        }
    }"#;

    #[test]
    fn test_load_fixture() {
        let store = MemoryStore::from_fixture_str(FIXTURE).unwrap();
        let column = Column::new("cf", "record");

        assert!(store.is_enabled("ns:t"));
        assert!(store.has_table("ns:off"));
        assert!(!store.is_enabled("ns:off"));
        assert_eq!(
            store.versions("ns:t", b"\0\0\0\0row", &column),
            vec![(7, b"hello".to_vec())]
        );
    }

    #[test]
    fn test_fixture_survives_reload() {
        let store = MemoryStore::from_fixture_str(FIXTURE).unwrap();
        let rendered = store.to_fixture_string().unwrap();
        let reloaded = MemoryStore::from_fixture_str(&rendered).unwrap();

        assert_eq!(reloaded.to_fixture_string().unwrap(), rendered);
    }

    #[test]
    fn test_bad_base64_is_rejected() {
        let err = MemoryStore::from_fixture_str(
            r#"{"tables":{"t":{"rows":[{"row":"***","cells":[]}]}}}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("row is not base64"));
        assert!(!err.is_fatal());
    }
}
