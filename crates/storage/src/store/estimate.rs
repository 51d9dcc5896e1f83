#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError};
use std::collections::BTreeMap;

/// Approximate row counts keyed by physical table name.
pub type TableEstimates = BTreeMap<String, i64>;

/// Cheap, best-effort row counts. An empty map means "no estimates"; it is never
/// an error.
pub trait EstimateSource {
    fn estimates(&self) -> TableEstimates;
}

/// Row counts from the planner statistics that `ANALYZE` writes to `sqlite_stat1`.
#[derive(Clone, Copy, Debug)]
pub struct SqliteStatEstimates<'a> {
    store: &'a SqliteStore,
}

impl<'a> SqliteStatEstimates<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }
}

impl EstimateSource for SqliteStatEstimates<'_> {
    fn estimates(&self) -> TableEstimates {
        match self.store.table_estimates() {
            Ok(estimates) => estimates,
            Err(err) if self.store.config().ephemeral => {
                tracing::debug!(error = %err, "table statistics unavailable");
                TableEstimates::new()
            }
            Err(err) => {
                tracing::error!(error = %err, "reading table statistics failed");
                TableEstimates::new()
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticEstimates {
    estimates: TableEstimates,
}

impl StaticEstimates {
    pub fn new(estimates: TableEstimates) -> Self {
        Self { estimates }
    }

    pub fn with(mut self, table: impl Into<String>, rows: i64) -> Self {
        self.estimates.insert(table.into(), rows);
        self
    }
}

impl EstimateSource for StaticEstimates {
    fn estimates(&self) -> TableEstimates {
        self.estimates.clone()
    }
}

impl SqliteStore {
    /// Reads `sqlite_stat1`. Fails when `ANALYZE` has never run on this database.
    pub fn table_estimates(&self) -> Result<TableEstimates, StoreError> {
        let mut stmt = self.conn.prepare("SELECT tbl, stat FROM sqlite_stat1")?;
        let mut rows = stmt.query([])?;
        let mut out = TableEstimates::new();

        while let Some(row) = rows.next()? {
            let table = row.get::<_, String>(0)?;
            let stat = row.get::<_, Option<String>>(1)?;
            let Some(rows_estimate) = stat.as_deref().and_then(leading_row_count) else {
                continue;
            };
            out.entry(table)
                .and_modify(|current| *current = (*current).max(rows_estimate))
                .or_insert(rows_estimate);
        }

        Ok(out)
    }
}

/// The first integer of a `sqlite_stat1.stat` value is the table's row count.
fn leading_row_count(stat: &str) -> Option<i64> {
    stat.split_whitespace().next()?.parse::<i64>().ok()
}
