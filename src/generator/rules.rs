//! Deterministic keyword rules.
//!
//! Rules are checked in order and the first match wins. Keywords are matched
//! case-insensitively; the Chinese keywords are matched literally.
//!
//! | keywords          | incremental                         | full                      |
//! |-------------------|-------------------------------------|---------------------------|
//! | `batch`, `批量`    | 4 patches recoloring every node     | same values as a tree     |
//! | `item1`, `项目1`   | status + item1                      | status + item1, keep rest |
//! | `item2`, `项目2`   | status + item2                      | default tree              |
//! | `reset`, `重置`    | status + items back to defaults     | default tree              |
//! | anything else     | status echoes the instruction       | default tree              |

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, Generated, GeneratorOutput, UpdateGenerator};
use crate::patch::{Patch, PatchBatch};
use crate::store::defaults::{default_tree, item_node, DEFAULT_ITEM_BG, DEFAULT_TEXT_COLOR};
use crate::store::UpdateMode;
use crate::tree::{TreeMap, TreeValue};
use async_trait::async_trait;

pub const RULES_GENERATOR_NAME: &str = "rules";

/// Characters of the instruction echoed by the default rule.
pub const ECHO_PREFIX_CHARS: usize = 20;

const BLUE: &str = "#2196f3";
const GREEN: &str = "#4caf50";
const ORANGE: &str = "#ff9800";
const PURPLE: &str = "#9c27b0";
const DEEP_PURPLE: &str = "#673ab7";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Batch,
    Item1,
    Item2,
    Reset,
    Echo,
}

impl Rule {
    /// Pick the rule for `instruction`.
    pub fn classify(instruction: &str) -> Self {
        let lower = instruction.to_lowercase();
        let has = |en: &str, zh: &str| lower.contains(en) || instruction.contains(zh);
        if has("batch", "批量") {
            Rule::Batch
        } else if has("item1", "项目1") {
            Rule::Item1
        } else if has("item2", "项目2") {
            Rule::Item2
        } else if has("reset", "重置") {
            Rule::Reset
        } else {
            Rule::Echo
        }
    }
}

fn styled(text: &str, key: &str, color: &str) -> TreeValue {
    let mut map = TreeMap::new();
    map.insert("text".to_string(), TreeValue::string(text));
    map.insert(key.to_string(), TreeValue::string(color));
    TreeValue::Map(map)
}

fn status(text: &str, color: &str) -> TreeValue {
    styled(text, "color", color)
}

fn item(text: &str, bg: &str) -> TreeValue {
    styled(text, "bgColor", bg)
}

/// Merge every field of `value` into `target`.
fn patch_from(target: &str, value: TreeValue) -> Patch {
    let mut patch = Patch::new(target);
    if let TreeValue::Map(map) = value {
        for (key, field) in map {
            patch.change.insert(key, Some(field));
        }
    }
    patch
}

fn batch_nodes() -> Vec<(&'static str, TreeValue)> {
    vec![
        ("statusLabel", status("Status: batch update complete", BLUE)),
        ("item1", item("Batch update - Item 1", BLUE)),
        ("item2", item("Batch update - Item 2", ORANGE)),
        ("item3", item("Batch update - Item 3", PURPLE)),
    ]
}

fn item_nodes(n: usize, instruction: &str, color: &str) -> Vec<(String, TreeValue)> {
    vec![
        (
            "statusLabel".to_string(),
            status(&format!("Status: item {} updated", n), color),
        ),
        (
            format!("item{}", n),
            item(&format!("Updated: {}", instruction), color),
        ),
    ]
}

fn echo_text(instruction: &str) -> String {
    let prefix: String = instruction.chars().take(ECHO_PREFIX_CHARS).collect();
    format!("Status: received - {}...", prefix)
}

/// Incremental answer for `instruction`.
pub fn incremental_rules(instruction: &str) -> PatchBatch {
    let patches = match Rule::classify(instruction) {
        Rule::Batch => batch_nodes()
            .into_iter()
            .map(|(target, value)| patch_from(target, value))
            .collect(),
        Rule::Item1 => item_nodes(1, instruction, GREEN)
            .into_iter()
            .map(|(target, value)| patch_from(&target, value))
            .collect(),
        Rule::Item2 => item_nodes(2, instruction, ORANGE)
            .into_iter()
            .map(|(target, value)| patch_from(&target, value))
            .collect(),
        Rule::Reset => {
            let mut patches = vec![patch_from(
                "statusLabel",
                status("Status: reset", DEFAULT_TEXT_COLOR),
            )];
            for n in 1..=3 {
                patches.push(patch_from(&format!("item{}", n), item_node(n)));
            }
            patches
        }
        Rule::Echo => vec![patch_from(
            "statusLabel",
            status(&echo_text(instruction), DEEP_PURPLE),
        )],
    };
    PatchBatch::new(patches)
}

/// Full-tree answer for `instruction` given the `current` tree.
pub fn full_rules(instruction: &str, current: &TreeValue) -> TreeValue {
    match Rule::classify(instruction) {
        Rule::Batch => {
            let mut root = TreeMap::new();
            for (key, value) in batch_nodes() {
                root.insert(key.to_string(), value);
            }
            TreeValue::Map(root)
        }
        Rule::Item1 => {
            let mut root = TreeMap::new();
            for (key, value) in item_nodes(1, instruction, GREEN) {
                root.insert(key, value);
            }
            for n in 2..=3 {
                let key = format!("item{}", n);
                let kept = current
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| item(&format!("Item {}", n), DEFAULT_ITEM_BG));
                root.insert(key, kept);
            }
            TreeValue::Map(root)
        }
        _ => default_tree(),
    }
}

/// Generator backed by the keyword rules. Never fails.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_now(&self, request: &GenerationRequest) -> GeneratorOutput {
        match request.mode {
            UpdateMode::Incremental => GeneratorOutput::Batch(incremental_rules(&request.instruction)),
            UpdateMode::Full => {
                GeneratorOutput::Tree(full_rules(&request.instruction, &request.current))
            }
        }
    }
}

#[async_trait]
impl UpdateGenerator for RuleBasedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, GenerationError> {
        Ok(Generated {
            output: self.generate_now(request),
            source: RULES_GENERATOR_NAME.to_string(),
        })
    }

    fn name(&self) -> &str {
        RULES_GENERATOR_NAME
    }
}
