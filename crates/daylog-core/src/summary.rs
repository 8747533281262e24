//! Read-side aggregation over the record set.
//!
//! Pure projections with no side effects. Callers re-list and recompute
//! after any mutation; nothing here is cached.

use crate::date;
use crate::record::DailyLog;

/// Aggregate stats over the full record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreTotals {
    /// Stored records, empty or not.
    pub records: usize,
    /// Records with something actually logged.
    pub days_logged: usize,
    /// Inclusive calendar-day span between the earliest and latest
    /// non-empty records; zero when nothing is logged.
    pub span_days: i64,
}

/// Per-record counts consumed by the editing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub supplements_taken: usize,
    pub exercises_done: usize,
    pub any_fasting: bool,
}

/// Compute aggregate stats over a listed record set.
pub fn store_totals(logs: &[DailyLog]) -> StoreTotals {
    let mut dates: Vec<&str> =
        logs.iter().filter(|l| !l.is_empty()).map(|l| l.date.as_str()).collect();
    dates.sort_unstable();

    let span_days = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => date::days_between(first, last).unwrap_or(0) + 1,
        _ => 0,
    };

    StoreTotals {
        records: logs.len(),
        days_logged: dates.len(),
        span_days,
    }
}

/// Summarize one record.
pub fn log_summary(log: &DailyLog) -> LogSummary {
    let custom = !log.custom_vitamin_name.trim().is_empty() && log.custom_vitamin_taken;
    LogSummary {
        supplements_taken: count_true(log.supplements.values()) + usize::from(custom),
        exercises_done: count_true(log.exercises.values()),
        any_fasting: log.fasted || log.water_fasted,
    }
}

fn count_true<'a>(values: impl Iterator<Item = &'a bool>) -> usize {
    values.filter(|&&v| v).count()
}
