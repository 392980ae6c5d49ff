//! Configuration for the analyzer, loaded from `.exponat.json`

use crate::error::{AnalyzerError, Result};
use crate::prompt;
use crate::types::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyzerConfig {
    /// Which provider answers analysis requests
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Optional file overriding the built-in analysis prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Fallback only; the OPENAI_API_KEY environment variable wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llava".to_string())
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            api_key: None,
        }
    }
}

impl OpenAiConfig {
    /// Resolve the hosted credential: environment first, config file second.
    /// The key never lives in source.
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                AnalyzerError::Config(
                    "OPENAI_API_KEY is not set and no api_key is configured".to_string(),
                )
            })
    }
}

fn find_config() -> Option<PathBuf> {
    // Try current directory first
    let local_config = PathBuf::from(".exponat.json");
    if local_config.exists() {
        return Some(local_config);
    }

    // Then home directory
    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".exponat.json");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

impl AnalyzerConfig {
    /// Load from the discovered config file, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match find_config() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            AnalyzerError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// The instruction prompt: file override if configured, built-in default
    /// otherwise.
    pub fn prompt(&self) -> Result<String> {
        match &self.prompt_file {
            Some(path) => prompt::load_prompt(path),
            None => Ok(prompt::DEFAULT_PROMPT.to_string()),
        }
    }
}
