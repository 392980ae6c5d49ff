//! exponat - describes technical museum objects from photographs using a
//! vision-language model, either a local Ollama server or a hosted
//! OpenAI-compatible endpoint.

pub mod backend;
pub mod config;
pub mod error;
pub mod prompt;
pub mod stream;
pub mod types;

pub use backend::{Analyzer, OllamaBackend, OpenAiBackend, VisionBackend, create_backend};
pub use config::{AnalyzerConfig, OllamaConfig, OpenAiConfig};
pub use error::{AnalyzerError, Result};
pub use stream::{NO_RESPONSE, Reassembler, reassemble};
pub use types::{AnalysisResult, BackendKind, ProgressFn};
