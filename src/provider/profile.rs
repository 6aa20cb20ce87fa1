//! Provider profile as written in configuration files.

use crate::error::ApiError;
use crate::provider::{ModelProvider, CompletionOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable consulted when an OpenAI profile has no `api_key`.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[serde(alias = "open_ai")]
    OpenAI,
    Ollama,
    #[serde(alias = "custom")]
    Local,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Ollama => "ollama",
            ProviderType::Local => "local",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[generator.provider]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ProviderConfig {
    /// Collect every problem with the profile.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.model.trim().is_empty() {
            errors.push("generator.provider.model must not be empty".to_string());
        }
        if self.provider_type == ProviderType::Local && self.endpoint.is_none() {
            errors.push("generator.provider.endpoint is required for local providers".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                errors.push(format!(
                    "generator.provider.endpoint must be an http(s) URL, got '{}'",
                    endpoint
                ));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                errors.push(format!(
                    "generator.provider.temperature must be within 0.0..=2.0, got {}",
                    t
                ));
            }
        }
        errors
    }

    /// Resolve the profile into a concrete provider. OpenAI keys fall back to
    /// `OPENAI_API_KEY`.
    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        match self.provider_type {
            ProviderType::OpenAI => {
                let api_key = self
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        ApiError::ConfigError(format!(
                            "OpenAI provider requires api_key or {}",
                            OPENAI_API_KEY_ENV
                        ))
                    })?;
                Ok(ModelProvider::OpenAI {
                    model: self.model.clone(),
                    api_key,
                    base_url: self.endpoint.clone(),
                })
            }
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Local => {
                let endpoint = self.endpoint.clone().ok_or_else(|| {
                    ApiError::ConfigError("Local provider requires an endpoint".to_string())
                })?;
                Ok(ModelProvider::LocalCustom {
                    model: self.model.clone(),
                    endpoint,
                    api_key: self.api_key.clone(),
                })
            }
        }
    }

    pub fn completion_options(&self) -> CompletionOptions {
        let defaults = CompletionOptions::default();
        CompletionOptions {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
        }
    }
}
