use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Largest window chrono can represent as a duration
const MAX_WINDOW_SECONDS: i64 = i64::MAX / 1000;

/// Configuration for the analyzer and the report server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input source configuration
    pub input: InputConfig,
    /// Detection rules configuration
    pub detection: DetectionConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// Report database configuration
    pub store: StoreConfig,
    /// Report API configuration
    pub api: ApiConfig,
}

/// Input source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// CSV file with `timestamp, user_id, ip_address, action` columns
    pub file_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            file_path: PathBuf::from("auth_logs.csv"),
        }
    }
}

/// Detection rules configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub enable_brute_force: bool,
    pub enable_external_access: bool,
    pub enable_geo_hop: bool,
    pub enable_statistical: bool,
    pub brute_force: BruteForceConfig,
    pub geo_hop: GeoHopConfig,
    pub statistical: StatisticalConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            enable_brute_force: true,
            enable_external_access: true,
            enable_geo_hop: true,
            enable_statistical: true,
            brute_force: BruteForceConfig::default(),
            geo_hop: GeoHopConfig::default(),
            statistical: StatisticalConfig::default(),
        }
    }
}

/// Brute force detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForceConfig {
    /// Time window in seconds, measured forward from each failure
    pub window_seconds: i64,
    /// Failed logins within the window that trigger an anomaly
    pub threshold: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        BruteForceConfig {
            window_seconds: 300,
            threshold: 5,
        }
    }
}

/// Geo-hop detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoHopConfig {
    /// Maximum gap in seconds between two successful logins from different IPs
    pub window_seconds: i64,
}

impl Default for GeoHopConfig {
    fn default() -> Self {
        GeoHopConfig { window_seconds: 300 }
    }
}

/// Statistical outlier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticalConfig {
    /// Threshold is mean + sigma_multiplier * standard deviation
    pub sigma_multiplier: f64,
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        StatisticalConfig {
            sigma_multiplier: 3.0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json", "jsonl", or "console"
    pub format: String,
    /// Output file path (ignored for "console")
    pub file_path: PathBuf,
    /// Also save the run as a record in the report database
    pub store_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "json".to_string(),
            file_path: PathBuf::from("anomaly_report.json"),
            store_report: false,
        }
    }
}

/// Report database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            db_path: PathBuf::from("reports.db"),
        }
    }
}

/// Report API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    /// Shared secret expected in the `x-api-key` header
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_address: "127.0.0.1:8000".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the detectors cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let detection = &self.detection;
        check_window("detection.brute_force.window_seconds", detection.brute_force.window_seconds)?;
        check_window("detection.geo_hop.window_seconds", detection.geo_hop.window_seconds)?;

        if detection.brute_force.threshold == 0 {
            return Err(ConfigError::Invalid(
                "detection.brute_force.threshold must be at least 1".to_string(),
            ));
        }

        let k = detection.statistical.sigma_multiplier;
        if !k.is_finite() || k < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "detection.statistical.sigma_multiplier must be a non-negative number, got {}",
                k
            )));
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn check_window(field: &str, seconds: i64) -> Result<(), ConfigError> {
    if (1..=MAX_WINDOW_SECONDS).contains(&seconds) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be between 1 and {}, got {}",
            field, MAX_WINDOW_SECONDS, seconds
        )))
    }
}
