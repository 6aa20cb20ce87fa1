//! Config loading facade.

use crate::config::merge::builder_with_defaults;
use crate::config::sources::{env, global_file, workspace_file};
use crate::config::UiTreeConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the layered configuration for `workspace_root`.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/{UITREE_ENV}.toml`,
    /// `UITREE__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<UiTreeConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = env::add_to_builder(builder);

        let config: UiTreeConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            provider = config.generator.provider.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load one explicit file over the defaults.
    pub fn load_from_file(path: &Path) -> Result<UiTreeConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only.
    pub fn default() -> UiTreeConfig {
        UiTreeConfig::default()
    }

    /// Where the global configuration file would be read from.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
