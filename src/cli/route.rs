//! CLI route: single route table and run context. Dispatches to the state API and presentation.

use crate::api::UiStateApi;
use crate::cli::help::{command_name, is_mutating, needs_store};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_changes, format_history, format_status, format_tree, format_update,
};
use crate::config::{ConfigLoader, GeneratorConfig, UiTreeConfig};
use crate::diff::diff;
use crate::error::{ApiError, StorageError};
use crate::generator::{FallbackGenerator, LlmGenerator, RuleBasedGenerator, UpdateGenerator};
use crate::patch::PatchBatch;
use crate::provider::{ModelProviderClient, ProviderFactory};
use crate::store::{default_tree, SledSnapshotStore, StateStore, UpdateMode};
use crate::tree::TreeValue;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, resolved config, and the
/// state API. The store is opened on first use so offline commands never
/// touch it.
pub struct RunContext {
    workspace_root: PathBuf,
    config: UiTreeConfig,
    generator: Arc<dyn UpdateGenerator>,
    api: OnceLock<UiStateApi>,
    runtime: Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    /// Create run context from an already-loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: UiTreeConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        let generator = build_generator(&config.generator)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::StorageError(StorageError::IoError(e)))?;

        debug!(
            workspace = %workspace_root.display(),
            generator = generator.name(),
            "CLI context initialized"
        );

        Ok(Self {
            workspace_root,
            config,
            generator,
            api: OnceLock::new(),
            runtime,
        })
    }

    pub fn config(&self) -> &UiTreeConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The state API, opening the store on first call.
    pub fn api(&self) -> Result<&UiStateApi, ApiError> {
        if let Some(api) = self.api.get() {
            return Ok(api);
        }
        let store = self.open_store()?;
        let api = UiStateApi::new(store.shared(), Arc::clone(&self.generator));
        Ok(self.api.get_or_init(|| api))
    }

    fn open_store(&self) -> Result<StateStore, ApiError> {
        if !self.config.storage.persist {
            debug!("Persistence disabled, using in-memory store");
            return Ok(StateStore::new(default_tree()));
        }
        let store_path = self
            .config
            .storage
            .resolve_store_path(&self.workspace_root);
        debug!(store_path = %store_path.display(), "Opening state store");
        let snapshots = SledSnapshotStore::open(&store_path)?;
        StateStore::open(default_tree(), Arc::new(snapshots))
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        if needs_store(command) {
            self.api()?;
        }
        let result = self.execute_inner(command);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) if is_mutating(command) => {
                info!(command = name, elapsed_ms, "Command committed")
            }
            Ok(_) => debug!(command = name, elapsed_ms, "Command completed"),
            Err(e) => debug!(command = name, elapsed_ms, kind = %e.kind(), "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::State { path } => {
                let api = self.api()?;
                let tree = match path {
                    Some(path) => api.state_at(path)?,
                    None => api.state(),
                };
                format_tree(&tree)
            }
            Commands::Send {
                instruction,
                mode,
                format,
            } => {
                let mode: UpdateMode = mode.parse().map_err(ApiError::ConfigError)?;
                let api = self.api()?;
                let response = self.runtime.block_on(api.submit(instruction, mode))?;
                format_update(&response, format)
            }
            Commands::Patch {
                input,
                message,
                format,
            } => {
                let batch = PatchBatch::from_json_str(&read_input(input)?).map_err(|e| {
                    ApiError::InvalidDocument(format!("Invalid patch JSON: {}", e))
                })?;
                let response = self.api()?.apply_patches(message, &batch)?;
                format_update(&response, format)
            }
            Commands::Replace {
                input,
                message,
                format,
            } => {
                let tree = parse_tree(input)?;
                let response = self.api()?.replace_tree(message, tree)?;
                format_update(&response, format)
            }
            Commands::Diff { old, new, format } => {
                let changes = diff(&parse_tree(old)?, &parse_tree(new)?);
                format_changes(&changes, format)
            }
            Commands::History { limit, format } => {
                let limit = limit.unwrap_or(self.config.history.default_limit);
                format_history(&self.api()?.history(limit), format)
            }
            Commands::Reset => {
                self.api()?.reset()?;
                Ok("State reset to initial values".to_string())
            }
            Commands::Status { format } => format_status(&self.api()?.status(), format),
        }
    }
}

/// Rules only without a provider; otherwise the provider with the rules as fallback.
fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn UpdateGenerator>, ApiError> {
    let Some(profile) = &config.provider else {
        return Ok(Arc::new(RuleBasedGenerator::new()));
    };
    let provider = profile.to_model_provider()?;
    let client: Arc<dyn ModelProviderClient> =
        Arc::from(ProviderFactory::create_client(&provider)?);
    let llm = LlmGenerator::new(client, profile.completion_options());
    Ok(Arc::new(FallbackGenerator::with_rules(
        Arc::new(llm),
        config.timeout(),
    )))
}

/// Inline JSON, or the contents of a file when prefixed with `@`.
pub fn read_input(arg: &str) -> Result<String, ApiError> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            ApiError::StorageError(StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to read '{}': {}", path, e),
            )))
        }),
        None => Ok(arg.to_string()),
    }
}

fn parse_tree(arg: &str) -> Result<TreeValue, ApiError> {
    TreeValue::from_json_str(&read_input(arg)?)
        .map_err(|e| ApiError::InvalidDocument(format!("Invalid tree JSON: {}", e)))
}
