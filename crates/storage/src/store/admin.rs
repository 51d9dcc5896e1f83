#![forbid(unsafe_code)]

use super::{
    COUNTER_COLUMNS, CreateCounterRequest, ListCountersRequest, RawCounter, SqliteStore,
    StoreError, UpdateCounterRequest, encode_context, is_constraint_violation, now_ms,
    to_sqlite_i64,
};
use rusqlite::params;
use tally_core::{Counter, CounterName};

impl SqliteStore {
    pub fn get_counter(&self, name: &CounterName) -> Result<Option<Counter>, StoreError> {
        self.counter_by_name(name)
    }

    pub fn list_counters(&self, request: ListCountersRequest) -> Result<Vec<Counter>, StoreError> {
        let limit = to_sqlite_i64(request.limit)?;
        let offset = to_sqlite_i64(request.offset)?;
        let pattern = request
            .name_contains
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(|needle| format!("%{}%", escape_like(needle)));

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COUNTER_COLUMNS} FROM counters \
             WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\') \
             ORDER BY name ASC \
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(params![pattern, limit, offset], RawCounter::from_row)?;

        let mut out = Vec::new();
        for raw in rows {
            out.push(raw?.into_counter()?);
        }
        Ok(out)
    }

    pub fn create_counter(&mut self, request: CreateCounterRequest) -> Result<Counter, StoreError> {
        let context_json = encode_context(request.context.as_ref())?;
        let now_ms = now_ms();

        let tx = self.conn.transaction()?;
        let insert = tx.execute(
            "INSERT INTO counters(name, value, context_json, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![request.name.as_str(), request.value, context_json, now_ms],
        );
        if let Err(err) = insert {
            if is_constraint_violation(&err) {
                return Err(StoreError::CounterAlreadyExists);
            }
            return Err(StoreError::Sql(err));
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Counter {
            id,
            name: request.name,
            value: request.value,
            context: request.context,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn update_counter(
        &mut self,
        name: &CounterName,
        request: UpdateCounterRequest,
    ) -> Result<Counter, StoreError> {
        if request.value.is_none() && request.context.is_none() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }

        let tx = self.conn.transaction()?;
        let current = tx
            .query_row(
                &format!("SELECT {COUNTER_COLUMNS} FROM counters WHERE name=?1"),
                params![name.as_str()],
                RawCounter::from_row,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UnknownCounter,
                other => StoreError::Sql(other),
            })?
            .into_counter()?;

        let value = request.value.unwrap_or(current.value);
        let context = request.context.unwrap_or(current.context);
        let context_json = encode_context(context.as_ref())?;
        let updated_at_ms = now_ms();

        tx.execute(
            "UPDATE counters SET value=?2, context_json=?3, updated_at_ms=?4 WHERE name=?1",
            params![name.as_str(), value, context_json, updated_at_ms],
        )?;
        tx.commit()?;

        Ok(Counter {
            value,
            context,
            updated_at_ms,
            ..current
        })
    }

    pub fn delete_counter(&mut self, name: &CounterName) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM counters WHERE name=?1", params![name.as_str()])?;
        Ok(deleted > 0)
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
