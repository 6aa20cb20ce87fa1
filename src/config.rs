//! Configuration System
//!
//! Layered configuration: built-in defaults, the global user file, the
//! workspace files, then `UITREE__*` environment overrides. Validation
//! reports every problem at once.

use crate::generator::fallback::DEFAULT_GENERATOR_TIMEOUT;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

pub const DEFAULT_STORE_PATH: &str = ".uitree/store";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiTreeConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and whether UI state is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Relative paths resolve against the workspace root
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_true")]
    pub persist: bool,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            persist: true,
        }
    }
}

impl StorageConfig {
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Update generator settings. Without a provider only the keyword rules run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT.as_millis() as u64
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Storage(String),
    Generator(String),
    History(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Generator(msg) => write!(f, "Generator: {}", msg),
            ValidationError::History(msg) => write!(f, "History: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl UiTreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store_path cannot be empty".to_string(),
            ));
        }

        if self.generator.timeout_ms == 0 {
            errors.push(ValidationError::Generator(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(provider) = &self.generator.provider {
            errors.extend(provider.validate().into_iter().map(ValidationError::Generator));
        }

        if self.history.default_limit == 0 {
            errors.push(ValidationError::History(
                "default_limit must be greater than zero".to_string(),
            ));
        }

        errors.extend(self.logging.validate().into_iter().map(ValidationError::Logging));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
