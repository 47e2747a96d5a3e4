//! Configuration loading and root folder resolution

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ceiling::CeilingSchedule;
use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "EXTRATETO_ROOT_FOLDER";
/// Environment variable overriding the upstream download endpoint
pub const API_URL_ENV: &str = "EXTRATETO_API_URL";
/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "extrateto.db";

/// Upstream CSV download endpoint
pub const DEFAULT_API_URL: &str = "https://api.dadosjusbr.org/uiapi/v2/download";

/// TOML configuration file contents; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Ceiling by year, keys are years as strings ("2025")
    #[serde(default)]
    pub ceilings: BTreeMap<String, f64>,
    #[serde(default)]
    pub anomalies: AnomalyConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream data source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Orchestrator batching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Concurrent organ fetches per batch
    pub batch_size: usize,
    /// Pause between batches
    pub batch_delay_ms: u64,
    /// First year of `--all` when no year is given
    pub start_year: i32,
    /// Upper bound on waiting for a locked database
    pub max_lock_wait_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay_ms: 500,
            start_year: 2024,
            max_lock_wait_ms: 5000,
        }
    }
}

/// Anomaly detection policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Minimum prior-month total for a transition to be considered
    pub floor: f64,
    /// Default jump threshold in percent (200 means current > 3x prior)
    pub default_min_percent: f64,
    pub max_results: i64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            floor: 50_000.0,
            default_min_percent: 200.0,
            max_results: 750,
        }
    }
}

/// Read cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            capacity: 64,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "extrateto_sync=debug"
    pub level: Option<String>,
}

impl TomlConfig {
    /// Ceiling schedule from the `[ceilings]` table, or the built-in one
    pub fn ceiling_schedule(&self) -> Result<CeilingSchedule> {
        if self.ceilings.is_empty() {
            return Ok(CeilingSchedule::default());
        }
        let by_year = self
            .ceilings
            .iter()
            .map(|(year, value)| {
                year.trim()
                    .parse::<i32>()
                    .map(|y| (y, *value))
                    .map_err(|_| Error::Config(format!("Invalid ceiling year: {}", year)))
            })
            .collect::<Result<BTreeMap<i32, f64>>>()?;
        CeilingSchedule::new(by_year)
    }

    /// Upstream endpoint, environment taking precedence over the file
    pub fn api_url(&self) -> String {
        std::env::var(API_URL_ENV).unwrap_or_else(|_| self.source.base_url.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.batch_size == 0 {
            return Err(Error::Config("sync.batch_size must be at least 1".to_string()));
        }
        if self.source.request_timeout_secs == 0 {
            return Err(Error::Config("source.request_timeout_secs must be at least 1".to_string()));
        }
        if self.anomalies.max_results <= 0 {
            return Err(Error::Config("anomalies.max_results must be positive".to_string()));
        }
        self.ceiling_schedule().map(|_| ())
    }
}

/// Load configuration from an explicit path, or the platform default path
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// `<config_dir>/extrateto/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("extrateto").join("config.toml"))
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("extrateto"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
