//! The daily-log record and its construction/merge rules.
//!
//! One `DailyLog` per calendar date, keyed by the ISO date string. Records
//! are materialized on demand with [`DailyLog::empty`] and only become
//! durable on their first non-empty save; see [`DailyLog::is_empty`] for
//! what counts as empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;

/// Serde/interchange names of the ten optional measurement fields, in
/// tabular column order.
pub const NUMERIC_FIELDS: [&str; 10] = [
    "fasting_blood_sugar",
    "pre_dinner_sugar",
    "post_dinner_sugar",
    "waist_size",
    "weight",
    "fat_percentage",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "grip_strength_left",
    "grip_strength_right",
];

/// One meal slot: a free-text time and description, independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealSlot {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub text: String,
}

/// The three meal slots of a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default)]
    pub breakfast: MealSlot,
    #[serde(default)]
    pub lunch: MealSlot,
    #[serde(default)]
    pub dinner: MealSlot,
}

/// A single day's log entry.
///
/// Field names double as the structured-interchange names, so changing one
/// is a file-format change. All fields except `date` default when absent in
/// a stored body; [`DailyLog::normalize`] then totalizes the boolean maps
/// and repairs anything a lenient load let through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub supplements: BTreeMap<String, bool>,
    #[serde(default)]
    pub custom_vitamin_name: String,
    #[serde(default)]
    pub custom_vitamin_taken: bool,
    #[serde(default)]
    pub exercises: BTreeMap<String, bool>,
    #[serde(default)]
    pub fasted: bool,
    #[serde(default)]
    pub water_fasted: bool,
    #[serde(default)]
    pub fasting_blood_sugar: Option<f64>,
    #[serde(default)]
    pub pre_dinner_sugar: Option<f64>,
    #[serde(default)]
    pub post_dinner_sugar: Option<f64>,
    #[serde(default)]
    pub waist_size: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub fat_percentage: Option<f64>,
    #[serde(default)]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(default)]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(default)]
    pub grip_strength_left: Option<f64>,
    #[serde(default)]
    pub grip_strength_right: Option<f64>,
    #[serde(default)]
    pub meals: MealPlan,
    #[serde(default)]
    pub notes: String,
}

impl DailyLog {
    /// Default-construct the record for a date: fresh id, every known flag
    /// false, every measurement absent.
    pub fn empty(date: &str) -> Self {
        DailyLog {
            id: Uuid::new_v4().to_string(),
            date: date.to_string(),
            supplements: catalog::supplement_ids().map(|id| (id.to_string(), false)).collect(),
            custom_vitamin_name: String::new(),
            custom_vitamin_taken: false,
            exercises: catalog::exercise_ids().map(|id| (id.to_string(), false)).collect(),
            fasted: false,
            water_fasted: false,
            fasting_blood_sugar: None,
            pre_dinner_sugar: None,
            post_dinner_sugar: None,
            waist_size: None,
            weight: None,
            fat_percentage: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            grip_strength_left: None,
            grip_strength_right: None,
            meals: MealPlan::default(),
            notes: String::new(),
        }
    }

    /// Repair a record after a lenient load: totalize the boolean maps over
    /// the catalogs, assign an id if the body carried none, and drop any
    /// non-finite measurement value.
    pub fn normalize(&mut self) {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        for id in catalog::supplement_ids() {
            self.supplements.entry(id.to_string()).or_insert(false);
        }
        for id in catalog::exercise_ids() {
            self.exercises.entry(id.to_string()).or_insert(false);
        }
        for field in NUMERIC_FIELDS {
            if let Some(v) = self.numeric(field) {
                if !v.is_finite() {
                    self.set_numeric(field, None);
                }
            }
        }
    }

    /// A record is empty when nothing in it is worth persisting: no flag is
    /// set, the custom vitamin is not both named and taken, and no
    /// measurement holds a value. Meals and notes deliberately do not count.
    pub fn is_empty(&self) -> bool {
        let any_supp = self.supplements.values().any(|&v| v)
            || (!self.custom_vitamin_name.trim().is_empty() && self.custom_vitamin_taken);
        let any_ex = self.exercises.values().any(|&v| v);
        let any_fast = self.fasted || self.water_fasted;
        let any_num = NUMERIC_FIELDS.iter().any(|f| self.numeric(f).is_some());
        !(any_supp || any_ex || any_fast || any_num)
    }

    /// Read a measurement field by its interchange name.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "fasting_blood_sugar" => self.fasting_blood_sugar,
            "pre_dinner_sugar" => self.pre_dinner_sugar,
            "post_dinner_sugar" => self.post_dinner_sugar,
            "waist_size" => self.waist_size,
            "weight" => self.weight,
            "fat_percentage" => self.fat_percentage,
            "blood_pressure_systolic" => self.blood_pressure_systolic,
            "blood_pressure_diastolic" => self.blood_pressure_diastolic,
            "grip_strength_left" => self.grip_strength_left,
            "grip_strength_right" => self.grip_strength_right,
            _ => None,
        }
    }

    /// Write a measurement field by its interchange name. Unknown names are
    /// ignored.
    pub fn set_numeric(&mut self, field: &str, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        match field {
            "fasting_blood_sugar" => self.fasting_blood_sugar = value,
            "pre_dinner_sugar" => self.pre_dinner_sugar = value,
            "post_dinner_sugar" => self.post_dinner_sugar = value,
            "waist_size" => self.waist_size = value,
            "weight" => self.weight = value,
            "fat_percentage" => self.fat_percentage = value,
            "blood_pressure_systolic" => self.blood_pressure_systolic = value,
            "blood_pressure_diastolic" => self.blood_pressure_diastolic = value,
            "grip_strength_left" => self.grip_strength_left = value,
            "grip_strength_right" => self.grip_strength_right = value,
            _ => {}
        }
    }
}

/// Merge incoming flag values over a known-id set.
///
/// Every known id ends up present (false unless the incoming map says
/// otherwise), and unknown incoming ids are preserved as-is for
/// forward-compat. Both import paths and the draft overlay use this.
pub fn merge_flags(
    known: impl IntoIterator<Item = &'static str>,
    incoming: &BTreeMap<String, bool>,
) -> BTreeMap<String, bool> {
    let mut merged: BTreeMap<String, bool> = known
        .into_iter()
        .map(|id| (id.to_string(), incoming.get(id).copied().unwrap_or(false)))
        .collect();
    for (id, &v) in incoming {
        merged.entry(id.clone()).or_insert(v);
    }
    merged
}

/// Normalize a raw measurement input: blank or unparseable becomes absent,
/// never zero; non-finite values are rejected.
pub fn parse_measurement(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The current field values of an editing surface, before they are merged
/// onto whatever is already stored for the active date.
///
/// A draft carries no id: identity comes from the stored record (or a fresh
/// default) it is applied to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogDraft {
    pub supplements: BTreeMap<String, bool>,
    pub custom_vitamin_name: String,
    pub custom_vitamin_taken: bool,
    pub exercises: BTreeMap<String, bool>,
    pub fasted: bool,
    pub water_fasted: bool,
    pub measurements: BTreeMap<String, f64>,
    pub meals: MealPlan,
    pub notes: String,
}

impl LogDraft {
    /// Seed a draft from a stored record, e.g. when an editing session
    /// starts on a date that already has data.
    pub fn from_log(log: &DailyLog) -> Self {
        let mut measurements = BTreeMap::new();
        for field in NUMERIC_FIELDS {
            if let Some(v) = log.numeric(field) {
                measurements.insert(field.to_string(), v);
            }
        }
        LogDraft {
            supplements: log.supplements.clone(),
            custom_vitamin_name: log.custom_vitamin_name.clone(),
            custom_vitamin_taken: log.custom_vitamin_taken,
            exercises: log.exercises.clone(),
            fasted: log.fasted,
            water_fasted: log.water_fasted,
            measurements,
            meals: log.meals.clone(),
            notes: log.notes.clone(),
        }
    }

    /// Overlay the draft onto a base record (whole-record overwrite, not a
    /// field patch). Identity and date come from the base; boolean maps are
    /// totalized against the catalogs; measurements are finite-or-absent.
    pub fn apply(&self, base: DailyLog) -> DailyLog {
        let mut log = base;
        log.supplements = merge_flags(catalog::supplement_ids(), &self.supplements);
        log.custom_vitamin_name = self.custom_vitamin_name.trim().to_string();
        log.custom_vitamin_taken = self.custom_vitamin_taken;
        log.exercises = merge_flags(catalog::exercise_ids(), &self.exercises);
        log.fasted = self.fasted;
        log.water_fasted = self.water_fasted;
        for field in NUMERIC_FIELDS {
            log.set_numeric(field, self.measurements.get(field).copied());
        }
        log.meals = self.meals.clone();
        log.notes = self.notes.clone();
        log
    }
}
