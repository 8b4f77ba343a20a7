//! OperationScope for begin/complete logging around a store operation
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` when finished
//! - Logs `{name}_INCOMPLETE` at WARN if dropped unfinished (early `?` return)

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the start and outcome of one operation.
///
/// ```ignore
/// let scope = OperationScope::with_fields("GET", &[("hbase_table_name", table)]);
/// let value = fetch()?;          // on `?`, drop logs GET_INCOMPLETE
/// scope.complete();              // logs GET_COMPLETE with elapsed_ms
/// ```
pub struct OperationScope<'a> {
    name: &'a str,
    finished: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    started: Instant,
}

impl<'a> OperationScope<'a> {
    /// Open a scope with no extra fields.
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Open a scope; `fields` are repeated on every line the scope logs.
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            finished: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
        }
    }

    /// Mark the operation successful.
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the operation successful, adding result fields to the line.
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.finished.set(true);
        let elapsed = self.elapsed_ms();

        let mut all_fields = self.field_refs();
        all_fields.extend(extra_fields.iter().copied());
        all_fields.push(("elapsed_ms", &elapsed));

        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Mark the operation failed. Logged at FATAL: scoped operations are
    /// store calls and store failures end the invocation.
    pub fn fail(self, reason: &str) {
        self.finished.set(true);
        let mut all_fields = self.field_refs();
        all_fields.push(("reason", reason));
        Logger::fatal(&format!("{}_FAILED", self.name), &all_fields);
    }

    /// Whether `complete` or `fail` has run.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    fn elapsed_ms(&self) -> String {
        self.started.elapsed().as_millis().to_string()
    }
}

impl Drop for OperationScope<'_> {
    fn drop(&mut self) {
        if !self.finished.get() {
            let mut all_fields = self.field_refs();
            all_fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &all_fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_unfinished() {
        let scope = OperationScope::new("TEST");
        assert!(!scope.is_finished());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields_completes() {
        let scope = OperationScope::with_fields("TEST", &[("hbase_table_name", "ns:t")]);
        scope.complete_with_fields(&[("rows_cleared", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = OperationScope::new("TEST");
        scope.fail("connection refused");
    }

    #[test]
    fn test_scope_drop_without_finish_does_not_panic() {
        let scope = OperationScope::new("TEST");
        drop(scope);
    }
}
