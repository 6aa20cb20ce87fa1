//! LLM-backed generator.

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, Generated, GeneratorOutput, UpdateGenerator};
use crate::patch::PatchBatch;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::store::UpdateMode;
use crate::tree::TreeValue;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const INCREMENTAL_PROMPT: &str = "You update the state of a UI described as a JSON tree. \
Answer with a JSON array of patches and nothing else. Each patch is \
{\"target\": \"<dotted path>\", \"change\": {\"<key>\": <value or null>}}. \
A path is dot-separated keys; inside a list a segment is either a position or a child's id. \
A non-null value inserts or overwrites the key, null deletes it, and \
{\"target\": \"x\", \"change\": {\"x\": null}} removes node x itself.";

const FULL_PROMPT: &str = "You update the state of a UI described as a JSON tree. \
Answer with the complete new tree as a single JSON object and nothing else. \
Keep every node the instruction does not mention unchanged.";

/// Generator that delegates to a chat-completion provider.
pub struct LlmGenerator {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
    name: String,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        let name = format!("llm:{}/{}", client.provider_name(), client.model_name());
        Self {
            client,
            options,
            name,
        }
    }

    fn messages(&self, request: &GenerationRequest) -> Result<Vec<ChatMessage>, GenerationError> {
        let system = match request.mode {
            UpdateMode::Incremental => INCREMENTAL_PROMPT,
            UpdateMode::Full => FULL_PROMPT,
        };
        let current = request
            .current
            .to_json_pretty()
            .map_err(|e| GenerationError::Request(format!("Failed to encode tree: {}", e)))?;
        Ok(vec![
            ChatMessage::system(system),
            ChatMessage::user(format!(
                "Current UI state:\n{}\n\nInstruction: {}",
                current, request.instruction
            )),
        ])
    }
}

#[async_trait]
impl UpdateGenerator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, GenerationError> {
        let messages = self.messages(request)?;
        let response = self
            .client
            .complete(messages, self.options.clone())
            .await
            .map_err(GenerationError::from)?;
        debug!(
            generator = %self.name,
            chars = response.content.len(),
            "Received generator response"
        );
        Ok(Generated {
            output: parse_output(&response.content, request.mode)?,
            source: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Interpret model output. Arrays are batches; objects are a single patch
/// when they look like one, otherwise a whole tree.
pub fn parse_output(content: &str, mode: UpdateMode) -> Result<GeneratorOutput, GenerationError> {
    let body = strip_code_fence(content);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::Unparseable(format!("{}: {}", e, preview(body))))?;

    let is_patch_object = value
        .as_object()
        .map(|o| o.contains_key("target") && o.len() <= 2)
        .unwrap_or(false);

    match value {
        serde_json::Value::Array(_) => batch_from(value).map(GeneratorOutput::Batch),
        serde_json::Value::Object(_) if is_patch_object && mode == UpdateMode::Incremental => {
            batch_from(value).map(GeneratorOutput::Batch)
        }
        serde_json::Value::Object(_) => Ok(GeneratorOutput::Tree(TreeValue::from(value))),
        other => Err(GenerationError::UnexpectedShape(format!(
            "expected a JSON array or object, got {}",
            TreeValue::from(other).type_name()
        ))),
    }
}

fn batch_from(value: serde_json::Value) -> Result<PatchBatch, GenerationError> {
    serde_json::from_value(value)
        .map_err(|e| GenerationError::UnexpectedShape(format!("not a patch batch: {}", e)))
}

fn preview(body: &str) -> String {
    body.chars().take(80).collect()
}
