//! CLI argument definitions using clap
//!
//! Commands:
//! - cellfetch handle --store <fixture> [--config <path>]
//! - cellfetch key
//! - cellfetch table --topic <topic> [--per-topic] [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cellfetch - deterministic row keys and single-cell store access
#[derive(Parser, Debug)]
#[command(name = "cellfetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one request from stdin against a fixture-backed store
    Handle {
        /// Path to configuration file; defaults plus environment when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the store fixture; mutations are written back
        #[arg(long)]
        store: PathBuf,
    },

    /// Derive the row key for a message body read from stdin
    Key,

    /// Resolve the table a topic maps to
    Table {
        /// Topic name
        #[arg(long)]
        topic: String,

        /// Force table-per-topic mode
        #[arg(long)]
        per_topic: bool,

        /// Path to configuration file; defaults plus environment when absent
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handle() {
        let cli = Cli::try_parse_from(["cellfetch", "handle", "--store", "s.json"]).unwrap();
        match cli.command {
            Command::Handle { config, store } => {
                assert!(config.is_none());
                assert_eq!(store, PathBuf::from("s.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_table_flags() {
        let cli = Cli::try_parse_from([
            "cellfetch",
            "table",
            "--topic",
            "db.a.b",
            "--per-topic",
        ])
        .unwrap();
        match cli.command {
            Command::Table {
                topic, per_topic, ..
            } => {
                assert_eq!(topic, "db.a.b");
                assert!(per_topic);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_handle_requires_store() {
        assert!(Cli::try_parse_from(["cellfetch", "handle"]).is_err());
    }
}
