//! Topic to table name resolution

mod errors;
mod resolver;

pub use errors::{TableError, TableResult};
pub use resolver::{qualified_table_name, topic_table_matcher, TableNameResolver};
