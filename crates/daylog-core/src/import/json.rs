//! Structured (JSON) import.
//!
//! Accepts a single record object or an array of them. Items without a
//! string `date` are dropped; everything else is merged onto a fresh
//! default record for its date and upserted. An unparseable file aborts
//! the whole import with nothing written.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::catalog;
use crate::error::{DaylogError, Result};
use crate::record::{merge_flags, DailyLog, NUMERIC_FIELDS};
use crate::storage::Store;

/// Import records from structured interchange text, returning how many
/// were accepted.
pub async fn import_json(store: &mut Store, text: &str) -> Result<usize> {
    let data: Value = serde_json::from_str(text)
        .map_err(|e| DaylogError::Import(format!("invalid JSON: {}", e)))?;

    let items = match data {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut accepted = 0;
    for item in items {
        let Value::Object(raw) = item else { continue };
        let Some(date) = raw.get("date").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        let log = record_from_value(&date, &raw);
        store.put(&log).await?;
        accepted += 1;
    }
    Ok(accepted)
}

/// Merge an incoming object onto a fresh default record: defaults first,
/// incoming fields override, boolean maps merged key-by-key against the
/// catalogs so missing ids still default to false.
fn record_from_value(date: &str, raw: &Map<String, Value>) -> DailyLog {
    let mut log = DailyLog::empty(date);

    if let Some(id) = raw.get("id").and_then(Value::as_str) {
        if !id.trim().is_empty() {
            log.id = id.to_string();
        }
    }

    log.supplements = merge_flags(
        catalog::supplement_ids(),
        &flags_from_value(raw.get("supplements")),
    );
    log.exercises = merge_flags(catalog::exercise_ids(), &flags_from_value(raw.get("exercises")));

    if let Some(name) = raw.get("custom_vitamin_name") {
        log.custom_vitamin_name = coerce_string(name).trim().to_string();
    }
    log.custom_vitamin_taken = raw.get("custom_vitamin_taken").is_some_and(coerce_bool);
    log.fasted = raw.get("fasted").is_some_and(coerce_bool);
    log.water_fasted = raw.get("water_fasted").is_some_and(coerce_bool);

    for field in NUMERIC_FIELDS {
        log.set_numeric(field, raw.get(field).and_then(coerce_number));
    }

    if let Some(meals) = raw.get("meals") {
        log.meals = serde_json::from_value(meals.clone()).unwrap_or_default();
    }
    if let Some(notes) = raw.get("notes") {
        log.notes = coerce_string(notes);
    }

    log
}

fn flags_from_value(value: Option<&Value>) -> BTreeMap<String, bool> {
    match value {
        Some(Value::Object(map)) => {
            map.iter().map(|(k, v)| (k.clone(), coerce_bool(v))).collect()
        }
        _ => BTreeMap::new(),
    }
}

/// One boolean-ish coercion rule shared with the tabular cell forms.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes")
        }
        _ => false,
    }
}

/// Finite number or absent; numeric strings are tolerated, everything else
/// normalizes to absent, never zero.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_onto_defaults_with_overrides() {
        let raw: Value = serde_json::from_str(
            r#"{
                "date": "2024-03-05",
                "id": "abc-123",
                "supplements": {"vitamin_d3": true, "mystery": "yes"},
                "custom_vitamin_name": "  Zinc  ",
                "custom_vitamin_taken": 1,
                "fasted": "true",
                "weight": "70.5",
                "waist_size": "",
                "notes": "from another device"
            }"#,
        )
        .unwrap();
        let Value::Object(raw) = raw else { unreachable!() };

        let log = record_from_value("2024-03-05", &raw);
        assert_eq!(log.id, "abc-123");
        assert_eq!(log.supplements.get("vitamin_d3"), Some(&true));
        assert_eq!(log.supplements.get("mystery"), Some(&true));
        assert_eq!(log.supplements.get("nac"), Some(&false));
        assert_eq!(log.custom_vitamin_name, "Zinc");
        assert!(log.custom_vitamin_taken);
        assert!(log.fasted);
        assert!(!log.water_fasted);
        assert_eq!(log.weight, Some(70.5));
        assert_eq!(log.waist_size, None);
        assert_eq!(log.notes, "from another device");
    }

    #[test]
    fn missing_id_gets_a_fresh_one() {
        let raw = Map::new();
        let log = record_from_value("2024-03-05", &raw);
        assert!(!log.id.is_empty());
    }

    #[test]
    fn bool_and_number_coercions() {
        assert!(coerce_bool(&Value::Bool(true)));
        assert!(coerce_bool(&serde_json::json!(1)));
        assert!(coerce_bool(&serde_json::json!("YES")));
        assert!(!coerce_bool(&serde_json::json!("false")));
        assert!(!coerce_bool(&serde_json::json!(0)));
        assert!(!coerce_bool(&Value::Null));

        assert_eq!(coerce_number(&serde_json::json!(70.5)), Some(70.5));
        assert_eq!(coerce_number(&serde_json::json!("70.5")), Some(70.5));
        assert_eq!(coerce_number(&serde_json::json!("")), None);
        assert_eq!(coerce_number(&serde_json::json!("abc")), None);
        assert_eq!(coerce_number(&Value::Null), None);
    }
}
