#![forbid(unsafe_code)]
#![allow(dead_code)]

use rusqlite::{Connection, params};
use tally_core::{Category, CategoryId, CounterName};
use tally_storage::{EngineConfig, SqliteStore};
use tempfile::TempDir;

pub(crate) struct Fixture {
    pub(crate) store: SqliteStore,
    pub(crate) dir: TempDir,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let config = EngineConfig {
            ephemeral: true,
            ..EngineConfig::default()
        };
        Self::with_config(config)
    }

    pub(crate) fn with_config(config: EngineConfig) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SqliteStore::open_with(dir.path(), config).expect("open store");
        Self { store, dir }
    }

    /// Second connection to the same database, standing in for the application
    /// that owns the tracked tables.
    pub(crate) fn app_conn(&self) -> Connection {
        let conn = Connection::open(self.store.db_path()).expect("open app connection");
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .expect("busy timeout");
        conn
    }

    pub(crate) fn seed_table(&self, table: &str, rows: usize) {
        let mut conn = self.app_conn();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (id INTEGER PRIMARY KEY, label TEXT NOT NULL)"
        ))
        .expect("create table");
        let tx = conn.transaction().expect("begin");
        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO \"{table}\"(label) VALUES (?1)"))
                .expect("prepare insert");
            for index in 0..rows {
                stmt.execute(params![format!("row-{index}")])
                    .expect("insert row");
            }
        }
        tx.commit().expect("commit");
    }
}

pub(crate) fn cat(value: &str) -> CategoryId {
    CategoryId::try_new(value).expect("category id")
}

pub(crate) fn category(table: &str) -> Category {
    Category::for_table(table).expect("category")
}

pub(crate) fn name(value: &str) -> CounterName {
    CounterName::try_new(value).expect("counter name")
}
