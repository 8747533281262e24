//! Dual-mode store facade with one-way downgrade.
//!
//! The `Store` owns both backends and a mode flag. The primary is opened
//! with a bounded, linearly backed-off retry; once anything goes wrong with
//! it (open exhaustion or any later operation failure) the store flips to
//! the fallback for the rest of its life and transparently re-issues the
//! failed logical operation there. There is no path back to the primary.
//!
//! Every operation is an explicit two-phase call: attempt primary, on
//! failure flip and attempt fallback once. Failures after the flip are real
//! errors and propagate.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::DailyLog;
use crate::storage::fallback::{JsonFileBackend, FALLBACK_FILE};
use crate::storage::sqlite::SqliteBackend;
use crate::storage::traits::RecordBackend;

const DB_FILE: &str = "daylog.db";

/// Which backend the store is currently operating against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Primary,
    Fallback,
}

/// Open policy for a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding both the database file and the fallback blob.
    pub dir: PathBuf,
    /// Total attempts at opening the primary before downgrading.
    pub open_attempts: u32,
    /// Base backoff between open attempts; multiplied by the attempt number.
    pub open_backoff: Duration,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            dir: dir.into(),
            open_attempts: 3,
            open_backoff: Duration::from_millis(150),
        }
    }
}

/// The record store the rest of the system talks to.
///
/// Single logical owner of the downgrade flag: the surrounding system is
/// cooperatively scheduled with one writer, so no lock guards the flag.
pub struct Store {
    primary: Option<SqliteBackend>,
    fallback: JsonFileBackend,
}

impl Store {
    /// Open the store rooted at `config.dir`, retrying the primary open per
    /// the policy and downgrading to the fallback if it never succeeds.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.dir)?;
        let db_path = config.dir.join(DB_FILE);
        let fallback = JsonFileBackend::new(config.dir.join(FALLBACK_FILE));

        let attempts = config.open_attempts.max(1);
        let mut primary = None;
        for attempt in 1..=attempts {
            match SqliteBackend::open(&db_path) {
                Ok(backend) => {
                    primary = Some(backend);
                    break;
                }
                Err(err) if attempt < attempts => {
                    // Transient open failures happen on constrained
                    // runtimes right after startup; back off and retry.
                    debug!(attempt, error = %err, "primary store open failed, retrying");
                    tokio::time::sleep(config.open_backoff * attempt).await;
                }
                Err(err) => {
                    warn!(attempts, error = %err, "primary store unavailable, using fallback store");
                }
            }
        }

        Ok(Store { primary, fallback })
    }

    pub fn mode(&self) -> StoreMode {
        if self.primary.is_some() {
            StoreMode::Primary
        } else {
            StoreMode::Fallback
        }
    }

    /// Flip to the fallback for the remainder of this store's life.
    fn downgrade(&mut self, op: &str, err: &crate::error::DaylogError) {
        warn!(op, error = %err, "primary store operation failed, downgrading to fallback store");
        self.primary = None;
    }

    /// Fetch the record for a date, if one is stored.
    pub async fn get(&mut self, date: &str) -> Result<Option<DailyLog>> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.get(date).await {
                Ok(found) => return Ok(found),
                Err(err) => self.downgrade("get", &err),
            }
        }
        self.fallback.get(date).await
    }

    /// Insert or replace the record under its date key.
    pub async fn put(&mut self, log: &DailyLog) -> Result<()> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.put(log).await {
                Ok(()) => return Ok(()),
                Err(err) => self.downgrade("put", &err),
            }
        }
        self.fallback.put(log).await
    }

    /// Remove the record for a date.
    pub async fn delete(&mut self, date: &str) -> Result<()> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.delete(date).await {
                Ok(()) => return Ok(()),
                Err(err) => self.downgrade("delete", &err),
            }
        }
        self.fallback.delete(date).await
    }

    /// Read every stored record. Order is unspecified; callers sort.
    pub async fn list_all(&mut self) -> Result<Vec<DailyLog>> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.list_all().await {
                Ok(logs) => return Ok(logs),
                Err(err) => self.downgrade("list_all", &err),
            }
        }
        self.fallback.list_all().await
    }

    /// Drop every stored record. The confirmation gesture belongs to the
    /// caller.
    pub async fn clear_all(&mut self) -> Result<()> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.clear().await {
                Ok(()) => return Ok(()),
                Err(err) => self.downgrade("clear", &err),
            }
        }
        self.fallback.clear().await
    }

    /// Delete every record with `from <= date <= to` (inclusive, by ISO
    /// string comparison), returning how many were dropped.
    ///
    /// The backends have no native range delete, so this is a
    /// read-modify-write over the whole table: list, partition, clear,
    /// reinsert the kept records.
    pub async fn clear_range(&mut self, from: &str, to: &str) -> Result<usize> {
        let all = self.list_all().await?;
        let (kept, dropped): (Vec<_>, Vec<_>) = all
            .into_iter()
            .partition(|l| !(l.date.as_str() >= from && l.date.as_str() <= to));
        self.clear_all().await?;
        for log in &kept {
            self.put(log).await?;
        }
        Ok(dropped.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_store(dir: &std::path::Path) -> Store {
        Store::open(StoreConfig::new(dir)).await.unwrap()
    }

    #[tokio::test]
    async fn opens_primary_on_a_healthy_directory() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path()).await;
        assert_eq!(store.mode(), StoreMode::Primary);
    }

    #[tokio::test(start_paused = true)]
    async fn open_exhaustion_downgrades_to_fallback() {
        let dir = tempdir().unwrap();
        // A directory where the database file should be makes every open
        // attempt fail.
        std::fs::create_dir_all(dir.path().join(DB_FILE)).unwrap();

        let mut store = open_store(dir.path()).await;
        assert_eq!(store.mode(), StoreMode::Fallback);

        // The fallback still serves the full contract.
        let mut log = DailyLog::empty("2024-03-05");
        log.fasted = true;
        store.put(&log).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert!(store.get("2024-03-05").await.unwrap().unwrap().fasted);
    }

    #[tokio::test]
    async fn operation_failure_downgrades_once_and_retries_on_fallback() {
        let dir = tempdir().unwrap();

        // Seed the primary database, then reopen it read-only so the next
        // write fails.
        let db_path = dir.path().join(DB_FILE);
        {
            let mut seeded = SqliteBackend::open(&db_path).unwrap();
            let mut old = DailyLog::empty("2024-03-01");
            old.fasted = true;
            seeded.put(&old).await.unwrap();
        }
        let read_only = SqliteBackend::open_with_flags(
            &db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )
        .unwrap();
        let mut store = Store {
            primary: Some(read_only),
            fallback: JsonFileBackend::new(dir.path().join(FALLBACK_FILE)),
        };
        assert_eq!(store.mode(), StoreMode::Primary);

        // The failed put is transparently re-issued against the fallback.
        let mut log = DailyLog::empty("2024-03-05");
        log.weight = Some(70.5);
        store.put(&log).await.unwrap();
        assert_eq!(store.mode(), StoreMode::Fallback);

        // Downgrade is one-directional: unrelated reads now see only the
        // fallback contents, not the still-readable primary.
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].date, "2024-03-05");
        assert!(store.get("2024-03-01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_range_is_inclusive_on_both_ends() {
        let dir = tempdir().unwrap();
        let mut store = open_store(dir.path()).await;

        for date in ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04", "2024-03-05"] {
            let mut log = DailyLog::empty(date);
            log.fasted = true;
            store.put(&log).await.unwrap();
        }

        let dropped = store.clear_range("2024-03-02", "2024-03-04").await.unwrap();
        assert_eq!(dropped, 3);

        let mut dates: Vec<_> =
            store.list_all().await.unwrap().into_iter().map(|l| l.date).collect();
        dates.sort();
        assert_eq!(dates, vec!["2024-03-01", "2024-03-05"]);
    }

    #[tokio::test]
    async fn clear_range_outside_stored_dates_drops_nothing() {
        let dir = tempdir().unwrap();
        let mut store = open_store(dir.path()).await;

        let mut log = DailyLog::empty("2024-03-05");
        log.fasted = true;
        store.put(&log).await.unwrap();

        let dropped = store.clear_range("2024-01-01", "2024-01-31").await.unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
