#![forbid(unsafe_code)]

mod admin;
mod error;
mod estimate;
mod mutation;
mod requests;
mod scan;

pub use error::StoreError;
pub use estimate::*;
pub use mutation::MutationOutcome;
pub use requests::*;
pub use scan::SchemaCategories;

use crate::EngineConfig;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tally_core::{CategoryId, Counter, CounterContext, CounterName};

pub const DB_FILE_NAME: &str = "tally.db";
pub const COUNTERS_TABLE: &str = tally_core::COUNTER_ENTITY;
pub const SCHEMA_STATE_TABLE: &str = "tally_schema_state";
const SCHEMA_VERSION: i64 = 1;

const COUNTER_COLUMNS: &str = "id, name, value, context_json, created_at_ms, updated_at_ms";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    config: EngineConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(storage_dir, EngineConfig::default())
    }

    pub fn open_with(
        storage_dir: impl AsRef<Path>,
        config: EngineConfig,
    ) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE_NAME))?;
        conn.busy_timeout(config.busy_timeout)?;
        conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0))?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;

        preflight_gate(&conn)?;
        install_schema(&conn)?;

        Ok(Self {
            conn,
            storage_dir,
            config,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE_NAME)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_excluded(&self, category: &CategoryId) -> bool {
        self.config.is_excluded(category)
    }

    /// Writes the value chosen by a reconciliation pass, creating the row on
    /// first touch. Returns the persisted counter.
    pub(crate) fn persist_reconciled(
        &self,
        name: &CounterName,
        value: i64,
    ) -> Result<Counter, StoreError> {
        let now_ms = now_ms();
        self.conn.execute(
            "INSERT INTO counters(name, value, context_json, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, NULL, ?3, ?3) \
             ON CONFLICT(name) DO UPDATE SET value=excluded.value, updated_at_ms=excluded.updated_at_ms",
            params![name.as_str(), value, now_ms],
        )?;
        self.counter_by_name(name)?.ok_or(StoreError::UnknownCounter)
    }

    /// Current value of a counter, without decoding the rest of the row.
    pub(crate) fn stored_value(&self, name: &CounterName) -> Result<Option<i64>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM counters WHERE name=?1",
                params![name.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?)
    }

    fn counter_by_name(&self, name: &CounterName) -> Result<Option<Counter>, StoreError> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {COUNTER_COLUMNS} FROM counters WHERE name=?1"),
                params![name.as_str()],
                RawCounter::from_row,
            )
            .optional()?;
        raw.map(RawCounter::into_counter).transpose()
    }
}

/// Counter row as stored, before name and context are validated.
struct RawCounter {
    id: i64,
    name: String,
    value: i64,
    context_json: Option<String>,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl RawCounter {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            value: row.get(2)?,
            context_json: row.get(3)?,
            created_at_ms: row.get(4)?,
            updated_at_ms: row.get(5)?,
        })
    }

    fn into_counter(self) -> Result<Counter, StoreError> {
        let name = CounterName::try_new(self.name)?;
        let context = match decode_context(self.context_json.as_deref()) {
            Ok(context) => context,
            Err(err) => {
                tracing::warn!(
                    counter = %name,
                    error = %err,
                    "ignoring undecodable counter context"
                );
                None
            }
        };
        Ok(Counter {
            id: self.id,
            name,
            value: self.value,
            context,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

fn decode_context(raw: Option<&str>) -> Result<Option<CounterContext>, StoreError> {
    match raw {
        None => Ok(None),
        Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
    }
}

fn encode_context(context: Option<&CounterContext>) -> Result<Option<String>, StoreError> {
    context
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let has_state = table_exists(conn, SCHEMA_STATE_TABLE)?;
    let has_counters = table_exists(conn, COUNTERS_TABLE)?;

    if !has_state {
        if has_counters {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: counters table exists without schema state",
            ));
        }
        return Ok(());
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM tally_schema_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tally_schema_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counters (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL UNIQUE,
          value INTEGER NOT NULL,
          context_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          CHECK(length(trim(name)) > 0 AND length(name) <= 100)
        );
        "#,
    )?;

    conn.execute(
        "INSERT INTO tally_schema_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}

/// Quotes an identifier for interpolation into SQL text.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
