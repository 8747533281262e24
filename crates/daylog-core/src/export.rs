//! Export serializations of the full record set.
//!
//! Two equivalent views: the structured format is lossless (one object per
//! record, pretty-printed); the tabular format is a fixed-column snapshot
//! of the flag maps and measurements. Both are sorted date-ascending.

use crate::catalog;
use crate::error::Result;
use crate::record::{DailyLog, NUMERIC_FIELDS};

/// Sort records date-ascending, the order both export formats use.
pub fn sort_by_date(mut logs: Vec<DailyLog>) -> Vec<DailyLog> {
    logs.sort_by(|a, b| a.date.cmp(&b.date));
    logs
}

/// Serialize the record set to the structured interchange format.
pub fn export_json(logs: Vec<DailyLog>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&sort_by_date(logs))?)
}

/// The fixed tabular column order. The header is part of the file format:
/// import matches these names case-sensitively.
pub fn csv_columns() -> Vec<String> {
    let mut cols = vec!["id".to_string(), "date".to_string()];
    cols.extend(catalog::supplement_ids().map(|id| format!("supp_{}", id)));
    cols.push("custom_vitamin_name".to_string());
    cols.push("custom_vitamin_taken".to_string());
    cols.extend(catalog::exercise_ids().map(|id| format!("ex_{}", id)));
    cols.push("fasted".to_string());
    cols.push("water_fasted".to_string());
    cols.extend(NUMERIC_FIELDS.iter().map(|f| f.to_string()));
    cols
}

/// Serialize the record set to the tabular interchange format.
pub fn export_csv(logs: Vec<DailyLog>) -> String {
    let mut lines = vec![csv_columns().join(",")];

    for log in sort_by_date(logs) {
        let mut row: Vec<String> = Vec::new();
        row.push(log.id.clone());
        row.push(log.date.clone());
        for id in catalog::supplement_ids() {
            row.push(flag(log.supplements.get(id).copied().unwrap_or(false)));
        }
        row.push(log.custom_vitamin_name.clone());
        row.push(flag(log.custom_vitamin_taken));
        for id in catalog::exercise_ids() {
            row.push(flag(log.exercises.get(id).copied().unwrap_or(false)));
        }
        row.push(flag(log.fasted));
        row.push(flag(log.water_fasted));
        for field in NUMERIC_FIELDS {
            row.push(log.numeric(field).map(fmt_number).unwrap_or_default());
        }
        lines.push(row.iter().map(|v| escape(v)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn fmt_number(value: f64) -> String {
    value.to_string()
}

/// RFC4180-style quoting: any value containing a comma, quote, or newline
/// is wrapped in quotes with internal quotes doubled.
fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
