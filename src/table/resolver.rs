//! Topic to table name resolution
//!
//! Topics of the form `<prefix>.<namespace>.<table>` map to the store table
//! `<namespace>:<table>` with hyphens turned into underscores. The prefix is
//! any run of non-dot characters and is discarded. Namespace and table
//! accept ASCII word characters and hyphens only.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::errors::{TableError, TableResult};
use crate::observability::{log_event, Event};

static QUALIFIED_TOPIC_PATTERN: OnceLock<Regex> = OnceLock::new();

fn qualified_topic_pattern() -> &'static Regex {
    QUALIFIED_TOPIC_PATTERN.get_or_init(|| {
        Regex::new(r"^[^.]+\.([-A-Za-z0-9_]+)\.([-A-Za-z0-9_]+)$")
            .expect("qualified topic pattern is a valid regex")
    })
}

/// Matches `topic` against the structured pattern.
///
/// Group 1 is the namespace and group 2 the table, both as written.
pub fn topic_table_matcher(topic: &str) -> Option<Captures<'_>> {
    qualified_topic_pattern().captures(topic)
}

/// Derives `<namespace>:<table>` from a structured topic, or `None`.
pub fn qualified_table_name(topic: &str) -> Option<String> {
    let captures = topic_table_matcher(topic)?;
    let namespace = captures.get(1)?.as_str();
    let table = captures.get(2)?.as_str();
    Some(format!("{}:{}", namespace, table).replace('-', "_"))
}

/// Resolves topics to table names for one deployment.
///
/// A pure function of the topic, the mode and the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNameResolver {
    default_table: String,
    table_per_topic: bool,
}

impl TableNameResolver {
    /// `table_per_topic` turns the mode on for every request; requests may
    /// still turn it on individually when it is off here.
    pub fn new(default_table: impl Into<String>, table_per_topic: bool) -> Self {
        Self {
            default_table: default_table.into(),
            table_per_topic,
        }
    }

    /// Resolves the table for `topic`.
    ///
    /// # Errors
    ///
    /// `UnresolvableTopic` when table-per-topic is in effect and the topic
    /// does not match `<prefix>.<namespace>.<table>`.
    pub fn resolve(&self, topic: &str, use_table_per_topic: bool) -> TableResult<String> {
        if !(use_table_per_topic || self.table_per_topic) {
            return Ok(self.default_table.clone());
        }

        match qualified_table_name(topic) {
            Some(table) => {
                log_event(
                    Event::TableResolved,
                    &[("input_topic", topic), ("hbase_table_name", &table)],
                );
                Ok(table)
            }
            None => {
                log_event(Event::TopicUnresolvable, &[("input_topic", topic)]);
                Err(TableError::UnresolvableTopic(topic.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matches(namespace: &str, table: &str) {
        let topic = format!("ab.{}.{}", namespace, table);
        let captures = topic_table_matcher(&topic).expect("topic should match");
        assert_eq!(&captures[1], namespace);
        assert_eq!(&captures[2], table);
    }

    fn assert_no_match(namespace: &str, table: &str) {
        let topic = format!("ab.{}.{}", namespace, table);
        assert!(topic_table_matcher(&topic).is_none(), "{} should not match", topic);
    }

    #[test]
    fn test_letters_match() {
        assert_matches("database", "collection");
    }

    #[test]
    fn test_alphanumeric_match() {
        assert_matches("database1", "collection1");
    }

    #[test]
    fn test_hyphens_match() {
        assert_matches("database-1", "collection-1");
    }

    #[test]
    fn test_underscores_match() {
        assert_matches("database_1", "collection_1");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_matches("DataBase", "Collection");
    }

    #[test]
    fn test_space_in_namespace_does_not_match() {
        assert_no_match("database_1 ", "collection_1");
    }

    #[test]
    fn test_punctuation_in_table_does_not_match() {
        assert_no_match("database_1", "collection_1!");
    }

    #[test]
    fn test_prefix_may_hold_any_non_dot_chars() {
        assert_eq!(
            qualified_table_name("db-prod:x.ns.tbl"),
            Some("ns:tbl".to_string())
        );
    }

    #[test]
    fn test_extra_segment_does_not_match() {
        assert_eq!(qualified_table_name("a.b.c.d"), None);
    }

    #[test]
    fn test_resolves_per_topic_with_underscores() {
        let resolver = TableNameResolver::new("data", false);
        assert_eq!(
            resolver.resolve("db.database-1.collection-1", true).unwrap(),
            "database_1:collection_1"
        );
    }

    #[test]
    fn test_unparseable_topic_is_error_when_per_topic() {
        let resolver = TableNameResolver::new("data", false);
        let err = resolver.resolve("database.collection", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not parse table name from topic: 'database.collection'"
        );
        assert_eq!(err.code(), "CELLFETCH_UNRESOLVABLE_TOPIC");
    }

    #[test]
    fn test_default_table_when_mode_off() {
        let resolver = TableNameResolver::new("data", false);
        assert_eq!(resolver.resolve("database.collection", false).unwrap(), "data");
        assert_eq!(resolver.resolve("db.ns.table", false).unwrap(), "data");
    }

    #[test]
    fn test_deployment_mode_overrides_request_flag() {
        let resolver = TableNameResolver::new("data", true);
        assert_eq!(resolver.resolve("db.ns.table", false).unwrap(), "ns:table");
        assert!(resolver.resolve("database.collection", false).is_err());
    }
}
