// Backend adapters that turn an image batch into a text description

mod ollama;
mod openai;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::types::{AnalysisResult, BackendKind, ProgressFn};
use async_trait::async_trait;

/// A provider that can describe a batch of images.
///
/// Every provider implements the same contract; adding one means adding an
/// implementation and a factory arm, never widening call-site branches.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Send the images with the instruction prompt and return the complete
    /// description text.
    async fn describe(
        &self,
        images: &[Vec<u8>],
        prompt: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<String>;

    fn kind(&self) -> BackendKind;
}

/// Build the adapter selected by the configuration
pub fn create_backend(kind: BackendKind, config: &AnalyzerConfig) -> Box<dyn VisionBackend> {
    match kind {
        BackendKind::Local => Box::new(OllamaBackend::new(config.ollama.clone())),
        BackendKind::Hosted => Box::new(OpenAiBackend::new(config.openai.clone())),
    }
}

/// Front door for callers: validates the input, dispatches to the configured
/// backend, and folds every failure into a plain `AnalysisResult` — transport
/// and provider errors never escape as faults.
pub struct Analyzer {
    backend: Box<dyn VisionBackend>,
    prompt: String,
}

impl Analyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let prompt = config.prompt()?;
        Ok(Self {
            backend: create_backend(config.backend, config),
            prompt,
        })
    }

    /// Assemble an analyzer around a specific backend instance
    pub fn with_backend(backend: Box<dyn VisionBackend>, prompt: impl Into<String>) -> Self {
        Self {
            backend,
            prompt: prompt.into(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Analyze a batch of images. An empty batch fails without any network
    /// call; every other failure comes back as a failed result carrying the
    /// full diagnostic text.
    pub async fn analyze(
        &self,
        images: &[Vec<u8>],
        progress: Option<&ProgressFn>,
    ) -> AnalysisResult {
        if images.is_empty() {
            return AnalysisResult::failure(AnalyzerError::NoImages.to_string());
        }

        if let Some(notify) = progress {
            notify(0.0, "Starting analysis");
        }

        match self.backend.describe(images, &self.prompt, progress).await {
            Ok(text) => {
                if let Some(notify) = progress {
                    notify(1.0, "Done");
                }
                AnalysisResult::success(text)
            }
            Err(e) => {
                log::warn!("{} analysis failed: {e}", self.backend.kind().as_str());
                AnalysisResult::failure(e.to_string())
            }
        }
    }
}
