#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError, now_ms};
use rusqlite::params;
use tally_core::{CategoryId, Counter, CounterMutator, CounterName};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Created,
    Updated,
    /// Excluded category, absent counter on decrement, or decrement at the floor.
    Skipped,
}

impl SqliteStore {
    /// Adds one to the category's total counter. Failures are logged, never returned.
    pub fn increment(&self, category: &CategoryId) {
        if let Err(err) = self.try_increment(category) {
            tracing::error!(
                counter = %category.total_counter_name(),
                error = %err,
                "counter increment failed"
            );
        }
    }

    /// Subtracts one from the category's total counter, stopping at 1. Failures are
    /// logged, never returned.
    pub fn decrement(&self, category: &CategoryId) {
        if let Err(err) = self.try_decrement(category) {
            tracing::error!(
                counter = %category.total_counter_name(),
                error = %err,
                "counter decrement failed"
            );
        }
    }

    pub fn try_increment(&self, category: &CategoryId) -> Result<MutationOutcome, StoreError> {
        if self.is_excluded(category) {
            return Ok(MutationOutcome::Skipped);
        }
        let name = category.total_counter_name();
        let now_ms = now_ms();

        if self.bump(&name, now_ms)? {
            return Ok(MutationOutcome::Updated);
        }

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO counters(name, value, context_json, created_at_ms, updated_at_ms) \
             VALUES (?1, 1, NULL, ?2, ?2)",
            params![name.as_str(), now_ms],
        )?;
        if inserted > 0 {
            return Ok(MutationOutcome::Created);
        }

        // Another writer created the row between the update and the insert.
        if self.bump(&name, now_ms)? {
            Ok(MutationOutcome::Updated)
        } else {
            Err(StoreError::UnknownCounter)
        }
    }

    pub fn try_decrement(&self, category: &CategoryId) -> Result<MutationOutcome, StoreError> {
        if self.is_excluded(category) {
            return Ok(MutationOutcome::Skipped);
        }
        let name = category.total_counter_name();

        // The floor is 1: a counter never reaches 0 through decrements.
        let changed = self.conn.execute(
            "UPDATE counters SET value = value - 1, updated_at_ms = ?2 \
             WHERE name = ?1 AND value > 1",
            params![name.as_str(), now_ms()],
        )?;

        if changed > 0 {
            Ok(MutationOutcome::Updated)
        } else {
            Ok(MutationOutcome::Skipped)
        }
    }

    pub fn lookup(&self, category: &CategoryId) -> Result<Option<Counter>, StoreError> {
        self.counter_by_name(&category.total_counter_name())
    }

    fn bump(&self, name: &CounterName, now_ms: i64) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE counters SET value = value + 1, updated_at_ms = ?2 WHERE name = ?1",
            params![name.as_str(), now_ms],
        )?;
        Ok(changed > 0)
    }
}

impl CounterMutator for SqliteStore {
    type Error = StoreError;

    fn increase(&self, category: &CategoryId) -> Result<(), StoreError> {
        self.try_increment(category).map(|_| ())
    }

    fn decrease(&self, category: &CategoryId) -> Result<(), StoreError> {
        self.try_decrement(category).map(|_| ())
    }
}
