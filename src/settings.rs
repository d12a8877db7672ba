//! Settings shared by the library components and the CLI.
//! Persisted in the platform-specific config directory via `directories::ProjectDirs`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default number of hand samples kept for the heatmap.
pub const MAX_HISTORY: usize = 10_000;

/// Settings errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot determine config directory")]
    NoConfigDir,
    #[error("Settings I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Native bounds used to seed the sensor connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Default for SensorBounds {
    fn default() -> Self {
        Self {
            x_min: -200.0,
            x_max: 200.0,
            y_min: 100.0,
            y_max: 500.0,
            z_min: -150.0,
            z_max: 150.0,
        }
    }
}

/// Sensor connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Sensor service host
    pub host: String,
    /// Sensor service port
    pub port: u16,
    /// Bounds the sensor starts with before reporting its own zone
    pub default_calibration: SensorBounds,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6437,
            default_calibration: SensorBounds::default(),
        }
    }
}

/// Calibration procedure settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Seconds a single hand must stay still to register a corner
    pub hold_duration: f64,
    /// Jitter tolerance in sensor units
    pub max_move_dist: f64,
    /// Fraction the active rectangle extends beyond the registered corners
    pub pad_perc: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            hold_duration: 2.0,
            max_move_dist: 20.0,
            pad_perc: 0.1,
        }
    }
}

impl CalibrationSettings {
    pub fn with_hold_duration(mut self, seconds: f64) -> Self {
        self.hold_duration = seconds;
        self
    }

    pub fn with_max_move_dist(mut self, dist: f64) -> Self {
        self.max_move_dist = dist;
        self
    }

    pub fn with_pad_perc(mut self, pad: f64) -> Self {
        self.pad_perc = pad;
        self
    }

    /// Hold duration as a `Duration`, saturating at `Duration::MAX`.
    pub fn hold(&self) -> Duration {
        Duration::try_from_secs_f64(self.hold_duration.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Heatmap grid settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    pub rows: usize,
    pub cols: usize,
    /// Rolling history length
    pub max_history: usize,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 16,
            max_history: MAX_HISTORY,
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub heatmap: HeatmapSettings,
}

/// Application settings that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub sensor: SensorSettings,
    pub calibration: CalibrationSettings,
    pub view: ViewSettings,
}

impl AppSettings {
    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hand-surface", "hand-surface")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path.
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load settings from the config directory, writing the defaults first
    /// if no settings file exists yet.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        Self::load_or_init(&path)
    }

    /// Load settings from `path`, creating it with defaults if missing.
    pub fn load_or_init(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.save_to(path)?;
            tracing::info!("Wrote default settings to {}", path.display());
            return Ok(defaults);
        }
        Self::load_from(path)
    }

    /// Load and validate settings from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the config directory.
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that values are within their documented domains.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let calib = &self.calibration;
        if !(calib.hold_duration > 0.0) {
            return Err(invalid("calibration.hold_duration", "must be > 0"));
        }
        if !(calib.max_move_dist > 0.0) {
            return Err(invalid("calibration.max_move_dist", "must be > 0"));
        }
        if !(0.0..0.5).contains(&calib.pad_perc) {
            return Err(invalid("calibration.pad_perc", "must be in [0, 0.5)"));
        }

        let heatmap = &self.view.heatmap;
        if heatmap.rows == 0 {
            return Err(invalid("view.heatmap.rows", "must be positive"));
        }
        if heatmap.cols == 0 {
            return Err(invalid("view.heatmap.cols", "must be positive"));
        }
        if heatmap.max_history == 0 {
            return Err(invalid("view.heatmap.max_history", "must be positive"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
