//! Startup configuration.
//!
//! # Responsibility
//! - Decode `KennelConfig` from TOML with per-field defaults.
//! - Name the storage backend once, before any service is constructed.
//!
//! # Invariants
//! - Defaults apply only when no config path is given; a named file that
//!   cannot be read is an error.
//! - `scan.period_secs` is never zero after validation.
//!
//! Example:
//!
//! ```toml
//! [storage]
//! backend = "sqlite"
//! path = "/var/lib/kennel/kennel.sqlite3"
//!
//! [inventory]
//! initial_small_slots = 5
//! initial_large_slots = 3
//!
//! [scan]
//! period_secs = 60
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/kennel"
//! ```

use crate::logging::default_log_level;
use crate::model::kennel::SizeClass;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SLOTS_PER_CLASS: usize = 5;
const DEFAULT_SCAN_PERIOD_SECS: u64 = 60;
const DEFAULT_SQLITE_PATH: &str = "kennel.sqlite3";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config TOML: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KennelConfig {
    pub storage: StorageConfig,
    pub inventory: InventoryConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file; only read by the `sqlite` backend.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

/// Slots seeded for a size class whose list has never been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub initial_small_slots: usize,
    pub initial_large_slots: usize,
}

impl InventoryConfig {
    pub fn seed_for(&self, size: SizeClass) -> usize {
        match size {
            SizeClass::Small => self.initial_small_slots,
            SizeClass::Large => self.initial_large_slots,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            initial_small_slots: DEFAULT_SLOTS_PER_CLASS,
            initial_large_slots: DEFAULT_SLOTS_PER_CLASS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub period_secs: u64,
}

impl ScanConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_SCAN_PERIOD_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory; file logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl KennelConfig {
    /// Decodes and validates configuration text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    ///
    /// # Errors
    /// - `ConfigError::Io` when the file cannot be read, including when it
    ///   does not exist.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            "event=config_load module=config status=ok source=file backend={}",
            config.storage.backend.as_str()
        );
        Ok(config)
    }

    /// Loads `path` when one is given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                info!("event=config_load module=config status=ok source=defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.scan.period_secs == 0 {
            return Err(ConfigError::Invalid(
                "scan.period_secs must be at least 1".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.path is required for the sqlite backend".to_string(),
            ));
        }
        Ok(())
    }
}
