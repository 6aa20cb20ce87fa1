//! Update Generators
//!
//! A generator turns a natural-language instruction plus the current tree
//! into either a patch batch (incremental) or a whole tree (full). The
//! generator runs outside the store lock; its output is applied afterwards.
//!
//! - [`RuleBasedGenerator`]: deterministic keyword rules, never fails.
//! - [`LlmGenerator`]: asks a chat-completion provider.
//! - [`FallbackGenerator`]: tries a primary generator under a timeout and
//!   falls back to a secondary one on any error.

pub mod fallback;
pub mod llm;
pub mod rules;

pub use fallback::FallbackGenerator;
pub use llm::LlmGenerator;
pub use rules::RuleBasedGenerator;

use crate::error::GenerationError;
use crate::patch::PatchBatch;
use crate::store::UpdateMode;
use crate::tree::TreeValue;
use async_trait::async_trait;

/// Input to a generator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub instruction: String,
    pub current: TreeValue,
    pub mode: UpdateMode,
}

impl GenerationRequest {
    pub fn new(instruction: impl Into<String>, current: TreeValue, mode: UpdateMode) -> Self {
        Self {
            instruction: instruction.into(),
            current,
            mode,
        }
    }
}

/// What a generator produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutput {
    Batch(PatchBatch),
    Tree(TreeValue),
}

impl GeneratorOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            GeneratorOutput::Batch(_) => "batch",
            GeneratorOutput::Tree(_) => "tree",
        }
    }
}

/// Output tagged with the name of the generator that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub output: GeneratorOutput,
    pub source: String,
}

#[async_trait]
pub trait UpdateGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, GenerationError>;

    fn name(&self) -> &str;
}
