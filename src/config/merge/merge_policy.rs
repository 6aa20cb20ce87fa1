//! Merge rules: defaults, override order, conflict handling.

use crate::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_STORE_PATH};
use crate::generator::fallback::DEFAULT_GENERATOR_TIMEOUT;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.store_path", DEFAULT_STORE_PATH)?
        .set_default("storage.persist", true)?
        .set_default(
            "generator.timeout_ms",
            DEFAULT_GENERATOR_TIMEOUT.as_millis() as i64,
        )?
        .set_default("history.default_limit", DEFAULT_HISTORY_LIMIT as i64)
}
