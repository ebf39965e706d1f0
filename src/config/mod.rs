//! Configuration management for timelens.
//!
//! Handles:
//! - The closed set of work categories
//! - Sprint window length
//! - Heatmap padding and intensity thresholds
//! - Deviation rating thresholds
//! - Display limits for the text report

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TimelensError};
use crate::util::atomic_write;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Work categories.
    #[serde(default)]
    pub categories: CategoryConfig,
    /// Sprint windowing.
    #[serde(default)]
    pub sprint: SprintConfig,
    /// Activity heatmap.
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    /// Estimate deviation rating.
    #[serde(default)]
    pub deviation: DeviationConfig,
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Project-specific configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = ".timelens.toml";

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge `.timelens.toml` from `project_dir`, if present, on top of
    /// this configuration.
    pub fn with_project_overrides(mut self, project_dir: &Path) -> Result<Self> {
        let project_config_path = project_dir.join(PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            debug!(path = %project_config_path.display(), "Merging project configuration");
            let project_config = Self::load_from(&project_config_path)?;
            self.merge_from(&project_config);
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TimelensError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| TimelensError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence where it
    /// differs from the defaults).
    pub fn merge_from(&mut self, other: &Config) {
        let defaults = Config::default();

        if other.categories.names != defaults.categories.names {
            self.categories.names = other.categories.names.clone();
        }

        if other.sprint.length_days != defaults.sprint.length_days {
            self.sprint.length_days = other.sprint.length_days;
        }

        if other.heatmap.padding_months != defaults.heatmap.padding_months {
            self.heatmap.padding_months = other.heatmap.padding_months;
        }
        if other.heatmap.fallback_months != defaults.heatmap.fallback_months {
            self.heatmap.fallback_months = other.heatmap.fallback_months;
        }
        if other.heatmap.level_thresholds_hours != defaults.heatmap.level_thresholds_hours {
            self.heatmap.level_thresholds_hours = other.heatmap.level_thresholds_hours;
        }

        if other.deviation.excellent_percent != defaults.deviation.excellent_percent {
            self.deviation.excellent_percent = other.deviation.excellent_percent;
        }
        if other.deviation.good_percent != defaults.deviation.good_percent {
            self.deviation.good_percent = other.deviation.good_percent;
        }

        if other.display.top_collaborations != defaults.display.top_collaborations {
            self.display.top_collaborations = other.display.top_collaborations;
        }
        if other.display.top_issues != defaults.display.top_issues {
            self.display.top_issues = other.display.top_issues;
        }
        if other.display.decimal_places != defaults.display.decimal_places {
            self.display.decimal_places = other.display.decimal_places;
        }
    }

    /// Check value ranges the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.categories.names.is_empty() {
            return Err(TimelensError::invalid_config("categories.names must not be empty"));
        }
        if self.categories.names.iter().any(|name| name.trim().is_empty()) {
            return Err(TimelensError::invalid_config("categories.names must not contain blank names"));
        }
        if self.sprint.length_days == 0 {
            return Err(TimelensError::invalid_config("sprint.length_days must be at least 1"));
        }

        let [low, mid, high] = self.heatmap.level_thresholds_hours;
        if !(low > 0.0 && low < mid && mid < high) {
            return Err(TimelensError::invalid_config(
                "heatmap.level_thresholds_hours must be positive and strictly ascending",
            ));
        }

        if self.deviation.excellent_percent < 0.0
            || self.deviation.excellent_percent > self.deviation.good_percent
        {
            return Err(TimelensError::invalid_config(
                "deviation.excellent_percent must be between 0 and deviation.good_percent",
            ));
        }

        Ok(())
    }

    /// Save configuration to a specific path.
    ///
    /// The config is written to a temporary file first, then atomically
    /// renamed to the target path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| TimelensError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())?;

        Ok(())
    }
}

/// Category configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category names, in display order. A label matches a category when
    /// its title equals one of these exactly.
    #[serde(default = "default_categories")]
    pub names: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            names: default_categories(),
        }
    }
}

/// Sprint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintConfig {
    /// Sprint window length in days.
    #[serde(default = "default_sprint_length")]
    pub length_days: u32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            length_days: default_sprint_length(),
        }
    }
}

/// Heatmap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Months of padding before the first and after the last logged day.
    #[serde(default = "default_padding_months")]
    pub padding_months: u32,
    /// Months shown, ending today, when there is no data.
    #[serde(default = "default_fallback_months")]
    pub fallback_months: u32,
    /// Upper bounds in hours for intensity levels 1, 2 and 3.
    /// Anything at or above the last bound is level 4.
    #[serde(default = "default_level_thresholds")]
    pub level_thresholds_hours: [f64; 3],
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            padding_months: default_padding_months(),
            fallback_months: default_fallback_months(),
            level_thresholds_hours: default_level_thresholds(),
        }
    }
}

/// Deviation rating configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationConfig {
    /// Absolute deviation (percent) up to which an estimate is excellent.
    #[serde(default = "default_excellent")]
    pub excellent_percent: f64,
    /// Absolute deviation (percent) up to which an estimate is good.
    #[serde(default = "default_good")]
    pub good_percent: f64,
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            excellent_percent: default_excellent(),
            good_percent: default_good(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Collaboration pairs shown in the text report.
    #[serde(default = "default_top_collaborations")]
    pub top_collaborations: usize,
    /// Deviating issues shown in the text report.
    #[serde(default = "default_top_issues")]
    pub top_issues: usize,
    /// Decimal places for hour and percent figures.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_collaborations: default_top_collaborations(),
            top_issues: default_top_issues(),
            decimal_places: default_decimal_places(),
        }
    }
}

// Default value functions for serde
fn default_categories() -> Vec<String> {
    [
        "Requirements Engineering",
        "Entwurf",
        "Implementation & Test",
        "Projektmanagement",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sprint_length() -> u32 {
    7
}

fn default_padding_months() -> u32 {
    1
}

fn default_fallback_months() -> u32 {
    6
}

fn default_level_thresholds() -> [f64; 3] {
    [1.0, 2.0, 4.0]
}

fn default_excellent() -> f64 {
    10.0
}

fn default_good() -> f64 {
    30.0
}

fn default_top_collaborations() -> usize {
    6
}

fn default_top_issues() -> usize {
    5
}

fn default_decimal_places() -> usize {
    2
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| TimelensError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("timelens").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.categories.names.len(), 4);
        assert_eq!(config.categories.names[1], "Entwurf");
        assert_eq!(config.sprint.length_days, 7);
        assert_eq!(config.display.top_collaborations, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();

        override_config.sprint.length_days = 14;
        override_config.categories.names = vec!["Bug".to_string(), "Feature".to_string()];
        override_config.display.top_issues = 10;

        base.merge_from(&override_config);

        assert_eq!(base.sprint.length_days, 14);
        assert_eq!(base.categories.names, vec!["Bug", "Feature"]);
        assert_eq!(base.display.top_issues, 10);
        assert_eq!(base.heatmap.padding_months, 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.sprint.length_days = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.categories.names.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heatmap.level_thresholds_hours = [2.0, 1.0, 4.0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.deviation.excellent_percent = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_project_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();

        let project_config = r#"
[sprint]
length_days = 14

[categories]
names = ["Bug", "Feature"]
"#;

        std::fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), project_config).unwrap();

        let config = Config::default().with_project_overrides(temp_dir.path()).unwrap();

        assert_eq!(config.sprint.length_days, 14);
        assert_eq!(config.categories.names, vec!["Bug", "Feature"]);
        assert_eq!(config.deviation.good_percent, 30.0);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[sprint]\nlength_days = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(TimelensError::InvalidConfig { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.decimal_places = 1;
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.display.decimal_places, 1);
    }
}
