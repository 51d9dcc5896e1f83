#![forbid(unsafe_code)]

use super::{SCHEMA_STATE_TABLE, SqliteStore, StoreError, quote_ident};
use tally_core::{Category, CategoryEnumerator};

impl SqliteStore {
    /// Full `COUNT(*)` of a backing table.
    pub fn try_exact_count(&self, table: &str) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?)
    }

    /// Like [`Self::try_exact_count`], but a missing or unreadable table counts as 0.
    pub fn exact_count(&self, table: &str) -> i64 {
        match self.try_exact_count(table) {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(table, error = %err, "exact count failed; using 0");
                0
            }
        }
    }

    /// User tables of the database, sorted by name. The counters table is
    /// included so that callers can see it being skipped.
    pub fn user_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name <> ?1 \
             ORDER BY name ASC",
        )?;
        let tables = stmt.query_map([SCHEMA_STATE_TABLE], |row| row.get::<_, String>(0))?;
        Ok(tables.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Every user table of the store's database is a category named after the table.
#[derive(Clone, Copy, Debug)]
pub struct SchemaCategories<'a> {
    store: &'a SqliteStore,
}

impl<'a> SchemaCategories<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }
}

impl CategoryEnumerator for SchemaCategories<'_> {
    type Error = StoreError;

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut out = Vec::new();
        for table in self.store.user_tables()? {
            match Category::for_table(table.clone()) {
                Ok(category) => out.push(category),
                Err(err) => {
                    tracing::warn!(table = %table, error = %err, "skipping untrackable table")
                }
            }
        }
        Ok(out)
    }
}
