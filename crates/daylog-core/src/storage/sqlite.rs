//! SQLite-backed primary store.
//!
//! One table, keyed by the ISO date string, holding each record as a JSON
//! body. The schema carries a version stamp in `user_version` so a future
//! layout change has something to check against.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{DaylogError, Result};
use crate::record::DailyLog;
use crate::storage::traits::RecordBackend;

const SCHEMA_VERSION: i32 = 1;

/// Primary backend: an embedded SQLite database.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (creating if needed) the database at `path` and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    #[cfg(test)]
    pub(crate) fn open_with_flags(path: &Path, flags: rusqlite::OpenFlags) -> Result<Self> {
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(SqliteBackend { conn })
    }

    fn initialize(conn: Connection) -> Result<Self> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > SCHEMA_VERSION {
            return Err(DaylogError::Storage(format!(
                "log database is schema version {}, this build supports up to {}",
                version, SCHEMA_VERSION
            )));
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS logs (
                date TEXT PRIMARY KEY,
                body TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_logs_date ON logs (date);
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(SqliteBackend { conn })
    }

    fn decode(body: &str) -> Result<DailyLog> {
        let mut log: DailyLog = serde_json::from_str(body)
            .map_err(|e| DaylogError::Storage(format!("corrupt log row: {}", e)))?;
        log.normalize();
        Ok(log)
    }
}

impl RecordBackend for SqliteBackend {
    async fn get(&mut self, date: &str) -> Result<Option<DailyLog>> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM logs WHERE date = ?1", [date], |row| row.get(0))
            .optional()?;
        body.as_deref().map(Self::decode).transpose()
    }

    async fn put(&mut self, log: &DailyLog) -> Result<()> {
        let body = serde_json::to_string(log)?;
        self.conn.execute(
            "INSERT INTO logs (date, body) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET body = excluded.body",
            rusqlite::params![log.date, body],
        )?;
        Ok(())
    }

    async fn delete(&mut self, date: &str) -> Result<()> {
        self.conn.execute("DELETE FROM logs WHERE date = ?1", [date])?;
        Ok(())
    }

    async fn list_all(&mut self) -> Result<Vec<DailyLog>> {
        // Forward cursor scan, accumulating rows.
        let mut stmt = self.conn.prepare("SELECT body FROM logs")?;
        let mut rows = stmt.query([])?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            logs.push(Self::decode(&body)?);
        }
        Ok(logs)
    }

    async fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM logs", [])?;
        Ok(())
    }
}
