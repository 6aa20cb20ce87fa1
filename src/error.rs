//! Error types for the UI tree state engine.

use thiserror::Error;

/// Stable, machine-readable error category.
///
/// Clients branch on these names; the `Display` text of the error carries the
/// offending path or key for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedPath,
    PathNotFound,
    ChildNotFound,
    IndexOutOfRange,
    TypeMismatch,
    GenerationError,
    EmptyInstruction,
    InvalidDocument,
    Storage,
    Config,
    Provider,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedPath => "MalformedPath",
            ErrorKind::PathNotFound => "PathNotFound",
            ErrorKind::ChildNotFound => "ChildNotFound",
            ErrorKind::IndexOutOfRange => "IndexOutOfRange",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::GenerationError => "GenerationError",
            ErrorKind::EmptyInstruction => "EmptyInstruction",
            ErrorKind::InvalidDocument => "InvalidDocument",
            ErrorKind::Storage => "Storage",
            ErrorKind::Config => "Config",
            ErrorKind::Provider => "Provider",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path parsing and resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("Path not found: '{path}' (missing segment '{segment}')")]
    PathNotFound { path: String, segment: String },

    #[error("Child not found: no list child with id '{id}' at '{path}'")]
    ChildNotFound { path: String, id: String },

    #[error("Index {index} out of range (len: {len}) at '{path}'")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PathError::MalformedPath { .. } => ErrorKind::MalformedPath,
            PathError::PathNotFound { .. } => ErrorKind::PathNotFound,
            PathError::ChildNotFound { .. } => ErrorKind::ChildNotFound,
            PathError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            PathError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }

    /// The path string the error was raised for.
    pub fn path(&self) -> &str {
        match self {
            PathError::MalformedPath { path, .. }
            | PathError::PathNotFound { path, .. }
            | PathError::ChildNotFound { path, .. }
            | PathError::IndexOutOfRange { path, .. }
            | PathError::TypeMismatch { path, .. } => path,
        }
    }
}

/// A batch was rejected; carries the first failing patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Patch #{index} (target '{target}') rejected: {source}")]
pub struct PatchError {
    /// Position of the failing patch within its batch
    pub index: usize,
    /// Target path string of the failing patch
    pub target: String,
    #[source]
    pub source: PathError,
}

impl PatchError {
    pub fn new(index: usize, target: impl Into<String>, source: PathError) -> Self {
        Self {
            index,
            target: target.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Update generator failures. Recovered locally by the fallback generator.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generator timed out after {0} ms")]
    Timeout(u64),

    #[error("Generator request failed: {0}")]
    Request(String),

    #[error("Generator returned unparseable content: {0}")]
    Unparseable(String),

    #[error("Generator returned an unexpected shape: {0}")]
    UnexpectedShape(String),
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot encode/decode failed: {0}")]
    Codec(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Top-level error surfaced by the request API and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Instruction cannot be empty")]
    EmptyInstruction,

    #[error("Batch rejected: {0}")]
    Patch(#[from] PatchError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::EmptyInstruction => ErrorKind::EmptyInstruction,
            ApiError::Patch(e) => e.kind(),
            ApiError::Path(e) => e.kind(),
            ApiError::InvalidDocument(_) => ErrorKind::InvalidDocument,
            ApiError::Generation(_) => ErrorKind::GenerationError,
            ApiError::StorageError(_) => ErrorKind::Storage,
            ApiError::ConfigError(_) => ErrorKind::Config,
            ApiError::ProviderError(_)
            | ApiError::ProviderRequestFailed(_)
            | ApiError::ProviderAuthFailed(_)
            | ApiError::ProviderRateLimit(_) => ErrorKind::Provider,
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<ApiError> for GenerationError {
    fn from(err: ApiError) -> Self {
        GenerationError::Request(err.to_string())
    }
}
