//! Record backend trait definition.
//!
//! The `RecordBackend` trait defines the interface both storage backends
//! implement. The [`Store`](super::Store) facade owns one of each and moves
//! between them; everything above the facade only sees this contract.

use crate::error::Result;
use crate::record::DailyLog;

/// Storage backend interface for daily-log records.
///
/// All implementations must ensure:
/// - `put` upserts on the date key: at most one stored record per date
/// - records coming back from `get`/`list_all` are normalized (boolean maps
///   total over the known id catalogs, measurements finite-or-absent)
/// - `list_all` order is unspecified; callers sort
///
/// Every operation is async and may fail with a backend-level error; the
/// facade converts those failures into the downgrade decision.
#[allow(async_fn_in_trait)]
pub trait RecordBackend {
    /// Fetch the record stored under a date key, if any.
    async fn get(&mut self, date: &str) -> Result<Option<DailyLog>>;

    /// Insert or replace the record under its date key.
    async fn put(&mut self, log: &DailyLog) -> Result<()>;

    /// Remove the record for a date. Deleting an absent date is not an error.
    async fn delete(&mut self, date: &str) -> Result<()>;

    /// Read every stored record.
    async fn list_all(&mut self) -> Result<Vec<DailyLog>>;

    /// Drop every stored record.
    async fn clear(&mut self) -> Result<()>;
}
