//! TOML configuration for the daylog CLI.
//!
//! Everything has a default; a missing config file is not an error unless
//! the user pointed at one explicitly. Flags override config, config
//! overrides defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaylogConfig {
    pub storage: StorageSection,
    pub autosave: AutosaveSection,
    pub import: ImportSection,
    pub measurements: MeasurementsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding the database and the fallback blob.
    pub dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSection {
    /// Debounce between the last edit and the save it triggers.
    pub debounce_ms: u64,
}

impl Default for AutosaveSection {
    fn default() -> Self {
        AutosaveSection { debounce_ms: 600 }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// Auto-date tabular rows with no resolvable date.
    pub auto_date_missing_rows: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementsSection {
    pub frequency: MeasureFrequency,
    /// Interval for `frequency = "custom"`, clamped to at least 2 days.
    pub interval_days: u32,
}

impl Default for MeasurementsSection {
    fn default() -> Self {
        MeasurementsSection {
            frequency: MeasureFrequency::Daily,
            interval_days: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureFrequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl DaylogConfig {
    /// Load config from `path`, or from the default location when `path`
    /// is `None`. An explicit path must exist; the default one may not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if !required => {
                tracing::debug!(path = %path.display(), error = %err, "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(anyhow::anyhow!("Cannot read config {}: {}", path.display(), err));
            }
        };

        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".config").join("daylog").join("config.toml"),
            None => PathBuf::from("daylog.toml"),
        }
    }

    /// Resolve the data directory: CLI flag, then config, then `~/.daylog`.
    pub fn data_dir(&self, flag: Option<&str>) -> PathBuf {
        if let Some(dir) = flag {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.storage.dir {
            return PathBuf::from(dir);
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".daylog"),
            None => PathBuf::from("daylog_data"),
        }
    }

    /// Effective measurement interval in days.
    pub fn measure_interval(&self) -> i64 {
        match self.measurements.frequency {
            MeasureFrequency::Daily => 1,
            MeasureFrequency::Weekly => 7,
            MeasureFrequency::Custom => i64::from(self.measurements.interval_days.max(2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_config_file() {
        let config = DaylogConfig::default();
        assert_eq!(config.autosave.debounce_ms, 600);
        assert!(!config.import.auto_date_missing_rows);
        assert_eq!(config.measure_interval(), 1);
    }

    #[test]
    fn parses_a_full_config() {
        let config: DaylogConfig = toml::from_str(
            r#"
            [storage]
            dir = "/tmp/daylog-test"

            [autosave]
            debounce_ms = 250

            [import]
            auto_date_missing_rows = true

            [measurements]
            frequency = "custom"
            interval_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.dir.as_deref(), Some("/tmp/daylog-test"));
        assert_eq!(config.autosave.debounce_ms, 250);
        assert!(config.import.auto_date_missing_rows);
        assert_eq!(config.measure_interval(), 3);
    }

    #[test]
    fn custom_interval_is_clamped_to_two_days() {
        let config: DaylogConfig = toml::from_str(
            r#"
            [measurements]
            frequency = "custom"
            interval_days = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.measure_interval(), 2);
    }

    #[test]
    fn weekly_frequency_ignores_interval_days() {
        let config: DaylogConfig = toml::from_str(
            r#"
            [measurements]
            frequency = "weekly"
            interval_days = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.measure_interval(), 7);
    }
}
