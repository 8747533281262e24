//! Measurement-interval gating.
//!
//! Presentation policy, not storage policy: measurement inputs are only
//! open on dates that land on the configured interval, anchored at the
//! earliest stored date. The core knows nothing about this; it is computed
//! here from a plain record listing.

use daylog_core::date;
use daylog_core::record::DailyLog;

/// Whether measurement inputs are open on `date`.
///
/// Daily cadence (interval <= 1) and an empty store are always open; after
/// that, only dates a whole number of intervals from the anchor are.
pub fn measurements_allowed(interval: i64, logs: &[DailyLog], date: &str) -> bool {
    if interval <= 1 {
        return true;
    }
    let Some(anchor) = logs.iter().map(|l| l.date.as_str()).min() else {
        return true;
    };
    match date::days_between(anchor, date) {
        Ok(diff) => diff % interval == 0,
        Err(_) => true,
    }
}
