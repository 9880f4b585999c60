use crate::{MetricName, FOLLOWERS_SCALE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for Reachboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReachboardConfig {
    /// HTTP bind address
    #[serde(default)]
    pub server: ServerConfig,

    /// Input tables and chart defaults
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Directory holding `time_vs_*.csv` and `user_groups.csv`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Metrics rendered as tabs, in order
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricName>,

    /// User whose trajectory is shown before any point is tapped.
    /// Falls back to the alphabetically first user when unset or absent.
    #[serde(default)]
    pub default_user: Option<String>,

    /// Divisor applied to follower counts to get point radii
    #[serde(default = "default_followers_scale")]
    pub followers_scale: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            metrics: default_metrics(),
            default_user: None,
            followers_scale: default_followers_scale(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_metrics() -> Vec<MetricName> {
    MetricName::ALL.to_vec()
}

fn default_followers_scale() -> f64 {
    FOLLOWERS_SCALE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: ReachboardConfig,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (`REACHBOARD_*`, optionally from a .env file)
    /// 2. Config file (.reachboard.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok())?;
        Self::validate_config(&config)?;

        info!("Configuration loaded");
        match config_path {
            Some(ref path) => info!("  config file: {}", path.display()),
            None => info!("  config file: none (using defaults)"),
        }
        info!("  data dir: {}", config.data.data_dir.display());
        info!(
            "  metrics: {}",
            config
                .data
                .metrics
                .iter()
                .map(MetricName::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { config })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
        }
    }

    /// Search order:
    /// 1. ./.reachboard.toml
    /// 2. ~/.reachboard/config.toml
    /// 3. defaults
    fn load_config_file() -> Result<(ReachboardConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".reachboard.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".reachboard").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((ReachboardConfig::default(), None))
    }

    pub fn read_toml_file(path: &Path) -> Result<ReachboardConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides<F>(
        mut config: ReachboardConfig,
        var: F,
    ) -> Result<ReachboardConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("REACHBOARD_HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("REACHBOARD_PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!("Ignoring invalid REACHBOARD_PORT: {}", port),
            }
        }

        if let Some(dir) = var("REACHBOARD_DATA_DIR") {
            config.data.data_dir = PathBuf::from(dir);
        }
        if let Some(metrics) = var("REACHBOARD_METRICS") {
            config.data.metrics = metrics
                .split(',')
                .filter(|m| !m.trim().is_empty())
                .map(|m| {
                    m.parse::<MetricName>()
                        .map_err(|e| ConfigError::ValidationError(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(user) = var("REACHBOARD_DEFAULT_USER") {
            config.data.default_user = Some(user).filter(|u| !u.is_empty());
        }
        if let Some(scale) = var("REACHBOARD_FOLLOWERS_SCALE") {
            match scale.parse() {
                Ok(scale) => config.data.followers_scale = scale,
                Err(_) => warn!("Ignoring invalid REACHBOARD_FOLLOWERS_SCALE: {}", scale),
            }
        }

        if let Some(level) = var("REACHBOARD_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = var("REACHBOARD_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    fn validate_config(config: &ReachboardConfig) -> Result<(), ConfigError> {
        if !(config.data.followers_scale.is_finite() && config.data.followers_scale > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "followers_scale must be a positive number, got {}",
                config.data.followers_scale
            )));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &ReachboardConfig {
        &self.config
    }

    pub fn into_config(self) -> ReachboardConfig {
        self.config
    }
}
