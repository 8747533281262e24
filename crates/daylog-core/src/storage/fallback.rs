//! Whole-blob JSON fallback store.
//!
//! The degraded backend: the full record array serialized into one file
//! under a well-known name. Every mutation is a read-modify-write of the
//! whole array; there is no partial update. Writes go through the atomic
//! replace helper so the blob is never observed half-written.

use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::fs::write_atomic;
use crate::record::DailyLog;
use crate::storage::traits::RecordBackend;

/// Well-known file name of the fallback blob, versioned with the record
/// layout.
pub const FALLBACK_FILE: &str = "daylog_logs_v1.json";

/// Fallback backend: one JSON file holding the full record array.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: PathBuf) -> Self {
        JsonFileBackend { path }
    }

    fn load(&self) -> Vec<DailyLog> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            // Missing file means an empty store; the first save creates it.
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<Vec<DailyLog>>(&raw) {
            Ok(mut logs) => {
                for log in &mut logs {
                    log.normalize();
                }
                logs
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "fallback blob unreadable, treating store as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, logs: &[DailyLog]) -> Result<()> {
        let body = serde_json::to_vec(logs)?;
        write_atomic(&self.path, &body)?;
        Ok(())
    }
}

impl RecordBackend for JsonFileBackend {
    async fn get(&mut self, date: &str) -> Result<Option<DailyLog>> {
        Ok(self.load().into_iter().find(|l| l.date == date))
    }

    async fn put(&mut self, log: &DailyLog) -> Result<()> {
        let mut all = self.load();
        match all.iter_mut().find(|l| l.date == log.date) {
            Some(existing) => *existing = log.clone(),
            None => all.push(log.clone()),
        }
        self.save(&all)
    }

    async fn delete(&mut self, date: &str) -> Result<()> {
        let mut all = self.load();
        all.retain(|l| l.date != date);
        self.save(&all)
    }

    async fn list_all(&mut self) -> Result<Vec<DailyLog>> {
        Ok(self.load())
    }

    async fn clear(&mut self) -> Result<()> {
        self.save(&[])
    }
}
