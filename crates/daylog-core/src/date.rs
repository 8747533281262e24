//! Calendar-date helpers for the ISO date keys.
//!
//! Every date a record is keyed by passes through here. All arithmetic is
//! done on `chrono::NaiveDate`, so no code path can be skewed by the local
//! timezone or DST transitions.

use chrono::{Duration, Local, NaiveDate};

use crate::error::{DaylogError, Result};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the local calendar, as an ISO key.
pub fn today_iso() -> String {
    to_iso(Local::now().date_naive())
}

/// Format a date as an ISO key.
pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` key.
pub fn parse_iso(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|_| DaylogError::Date(format!("expected YYYY-MM-DD, got \"{value}\"")))
}

/// Shift an ISO key by a number of calendar days.
pub fn add_days(iso: &str, delta: i64) -> Result<String> {
    let date = parse_iso(iso)?;
    Ok(to_iso(date + Duration::days(delta)))
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: &str, to: &str) -> Result<i64> {
    Ok((parse_iso(to)? - parse_iso(from)?).num_days())
}

/// Lenient parser for dates arriving from import files.
///
/// Accepts ISO `YYYY-MM-DD`, day-first `D/M/YYYY` and `D-M-YYYY`, and
/// `YYYY/M/D`. Anything else yields `None`, including calendar-invalid
/// dates like `31/02/2024`. The result is always a normalized ISO key.
pub fn parse_flexible(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, ISO_FORMAT) {
        return Some(to_iso(date));
    }

    for sep in ['/', '-'] {
        let parts: Vec<&str> = value.split(sep).collect();
        if parts.len() != 3 {
            continue;
        }
        let nums: Option<Vec<u32>> = parts.iter().map(|p| p.parse().ok()).collect();
        let Some(nums) = nums else { continue };

        // A 4-digit leading field means year-first; that form is only
        // written with slashes in the files we ingest.
        let date = if parts[0].len() == 4 {
            if sep != '/' {
                continue;
            }
            NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2])
        } else if parts[2].len() == 4 && parts[0].len() <= 2 && parts[1].len() <= 2 {
            // Day-first, per the exports this tool historically ingested.
            NaiveDate::from_ymd_opt(nums[2] as i32, nums[1], nums[0])
        } else {
            None
        };

        if let Some(date) = date {
            return Some(to_iso(date));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days("2024-01-31", 1).unwrap(), "2024-02-01");
        assert_eq!(add_days("2023-12-31", 1).unwrap(), "2024-01-01");
        assert_eq!(add_days("2024-03-01", -1).unwrap(), "2024-02-29");
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between("2024-03-05", "2024-03-05").unwrap(), 0);
        assert_eq!(days_between("2024-03-05", "2024-03-08").unwrap(), 3);
        assert_eq!(days_between("2024-03-08", "2024-03-05").unwrap(), -3);
    }

    #[test]
    fn flexible_accepts_the_supported_shapes() {
        assert_eq!(parse_flexible("2024-03-05").as_deref(), Some("2024-03-05"));
        assert_eq!(parse_flexible("05/03/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(parse_flexible("5/3/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(parse_flexible("05-03-2024").as_deref(), Some("2024-03-05"));
        assert_eq!(parse_flexible("2024/3/5").as_deref(), Some("2024-03-05"));
        assert_eq!(parse_flexible(" 2024-03-05 ").as_deref(), Some("2024-03-05"));
        // chrono's numeric fields tolerate missing zero padding.
        assert_eq!(parse_flexible("2024-3-5").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn flexible_rejects_garbage_and_invalid_calendar_dates() {
        assert_eq!(parse_flexible(""), None);
        assert_eq!(parse_flexible("yesterday"), None);
        assert_eq!(parse_flexible("31/02/2024"), None);
        assert_eq!(parse_flexible("2024-13-01"), None);
        assert_eq!(parse_flexible("2024/13/1"), None);
    }
}
