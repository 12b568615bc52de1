//! Configuration for the Samatal host application
//!
//! Loads configuration from a TOML file. Every field has a default, so a
//! partial file (or none at all) is valid.

use crate::core::types::DeviceRotation;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Longest accepted moving-average window (ms)
pub const MAX_EXPIRATION_MS: u64 = 60_000;

/// Accepted simulated sample rates (Hz)
pub const MIN_RATE_HZ: f64 = 0.1;
pub const MAX_RATE_HZ: f64 = 1_000.0;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub inclinometer: InclinometerSettings,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Moving-average filter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Samples older than this (sensor clock, ms) drop out of the average
    #[serde(default = "default_expiration_ms")]
    pub expiration_ms: u64,
}

/// Inclinometer output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InclinometerSettings {
    /// Minimum time between listener notifications (ms)
    ///
    /// 333 ms keeps the output at or below 3 Hz.
    #[serde(default = "default_notify_interval_ms")]
    pub notify_interval_ms: u64,

    /// Roll is forced to zero when averaged x and y are both below this (m/s²)
    #[serde(default = "default_roll_zero_threshold")]
    pub roll_zero_threshold: f64,
}

/// Mock accelerometer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Sample rate (Hz)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,
    /// Simulated vehicle pitch (degrees)
    #[serde(default)]
    pub pitch_deg: f64,
    /// Simulated vehicle roll (degrees)
    #[serde(default)]
    pub roll_deg: f64,
    /// Device rotation reported to the pipeline
    #[serde(default)]
    pub rotation: DeviceRotation,
    /// Which edge faces down when `rotation` is landscape
    #[serde(default)]
    pub landscape_right_down: bool,
    /// Per-axis Gaussian noise (m/s²)
    #[serde(default = "default_noise_stddev")]
    pub noise_stddev: f32,
    /// RNG seed, 0 for entropy
    #[serde(default)]
    pub random_seed: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_expiration_ms() -> u64 {
    500
}

fn default_notify_interval_ms() -> u64 {
    333
}

fn default_roll_zero_threshold() -> f64 {
    0.25
}

fn default_rate_hz() -> f64 {
    50.0
}

fn default_noise_stddev() -> f32 {
    0.05
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expiration_ms: default_expiration_ms(),
        }
    }
}

impl Default for InclinometerSettings {
    fn default() -> Self {
        Self {
            notify_interval_ms: default_notify_interval_ms(),
            roll_zero_threshold: default_roll_zero_threshold(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            pitch_deg: 0.0,
            roll_deg: 0.0,
            rotation: DeviceRotation::Portrait,
            landscape_right_down: false,
            noise_stddev: default_noise_stddev(),
            random_seed: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use samatal::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("samatal.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_EXPIRATION_MS).contains(&self.filter.expiration_ms) {
            return Err(Error::InvalidParameter(format!(
                "filter.expiration_ms must be within 1..={}, got {}",
                MAX_EXPIRATION_MS, self.filter.expiration_ms
            )));
        }
        if !(MIN_RATE_HZ..=MAX_RATE_HZ).contains(&self.simulation.rate_hz) {
            return Err(Error::InvalidParameter(format!(
                "simulation.rate_hz must be within {}..={}, got {}",
                MIN_RATE_HZ, MAX_RATE_HZ, self.simulation.rate_hz
            )));
        }
        if !self.simulation.noise_stddev.is_finite() || self.simulation.noise_stddev < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "simulation.noise_stddev must be non-negative, got {}",
                self.simulation.noise_stddev
            )));
        }
        if !self.inclinometer.roll_zero_threshold.is_finite() {
            return Err(Error::InvalidParameter(
                "inclinometer.roll_zero_threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.filter.expiration_ms, 500);
        assert_eq!(config.inclinometer.notify_interval_ms, 333);
        assert_eq!(config.inclinometer.roll_zero_threshold, 0.25);
        assert_eq!(config.simulation.rotation, DeviceRotation::Portrait);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[filter]"));
        assert!(toml_string.contains("[inclinometer]"));
        assert!(toml_string.contains("[simulation]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("notify_interval_ms = 333"));
        assert!(toml_string.contains("rotation = \"portrait\""));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[inclinometer]
notify_interval_ms = 100

[simulation]
pitch_deg = 5.0
rotation = "landscape"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.inclinometer.notify_interval_ms, 100);
        assert_eq!(config.inclinometer.roll_zero_threshold, 0.25);
        assert_eq!(config.filter.expiration_ms, 500);
        assert_eq!(config.simulation.pitch_deg, 5.0);
        assert_eq!(config.simulation.rotation, DeviceRotation::Landscape);
        assert_eq!(config.simulation.rate_hz, 50.0);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samatal.toml");

        let mut config = AppConfig::default();
        config.simulation.roll_deg = -3.5;
        config.to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.simulation.roll_deg, -3.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.filter.expiration_ms = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));

        let mut config = AppConfig::default();
        config.simulation.rate_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let mut config = AppConfig::default();
        config.filter.expiration_ms = MAX_EXPIRATION_MS + 1;
        assert!(config.validate().is_err());
        config.filter.expiration_ms = MAX_EXPIRATION_MS;
        assert!(config.validate().is_ok());

        for rate_hz in [1e-300, MAX_RATE_HZ * 2.0, f64::NAN, f64::INFINITY] {
            let mut config = AppConfig::default();
            config.simulation.rate_hz = rate_hz;
            assert!(
                matches!(config.validate(), Err(Error::InvalidParameter(_))),
                "rate_hz = {}",
                rate_hz
            );
        }
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[filter]\nexpiration_ms = \"soon\"\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(Error::ConfigParse(_))
        ));
    }
}
