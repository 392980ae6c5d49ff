//! Error types for image analysis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("no images supplied")]
    NoImages,

    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx provider reply. Status and body are kept verbatim so the
    /// caller sees the provider's own diagnostic text.
    #[error("{backend} API error: {status} {body}")]
    Api {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
