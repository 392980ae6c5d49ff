// Core types shared by the analysis backends

use serde::{Deserialize, Serialize};

/// Progress observer: completed fraction in 0.0..=1.0 plus a short stage
/// label. Callers that don't care pass `None`; no UI toolkit is assumed.
pub type ProgressFn = dyn Fn(f32, &str) + Send + Sync;

/// Which provider handles an analysis request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Self-hosted Ollama server, line-streamed generate endpoint
    #[default]
    Local,
    /// Hosted OpenAI-compatible chat-completion endpoint
    Hosted,
}

impl BackendKind {
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Hosted => "hosted",
        }
    }

    /// Parse a CLI/config backend name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "local" | "ollama" => Some(BackendKind::Local),
            "hosted" | "openai" => Some(BackendKind::Hosted),
            _ => None,
        }
    }
}

/// Outcome of one analysis request. Constructed fresh per request and never
/// mutated after it is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl AnalysisResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }

    /// Display-ready text: the description on success, the human-readable
    /// error message otherwise.
    pub fn into_display_string(self) -> String {
        if self.succeeded {
            self.text
        } else {
            self.error_detail
                .unwrap_or_else(|| "analysis failed".to_string())
        }
    }
}
