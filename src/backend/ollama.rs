// Local Ollama adapter - streams /api/generate line by line

use super::VisionBackend;
use crate::config::OllamaConfig;
use crate::error::{AnalyzerError, Result};
use crate::stream::Reassembler;
use crate::types::{BackendKind, ProgressFn};
use async_trait::async_trait;
use base64::Engine;
use futures_util::StreamExt;
use serde::Serialize;

pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl VisionBackend for OllamaBackend {
    async fn describe(
        &self,
        images: &[Vec<u8>],
        prompt: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<String> {
        let engine = base64::engine::general_purpose::STANDARD;
        let images: Vec<String> = images.iter().map(|bytes| engine.encode(bytes)).collect();

        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            images,
            stream: true,
        };

        if let Some(notify) = progress {
            notify(0.5, "Sending images to Ollama");
        }
        log::debug!(
            "POST {}/api/generate model={} images={}",
            self.config.host,
            self.config.model,
            request.images.len()
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Keep the provider's own diagnostic text intact
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api {
                backend: "Ollama",
                status: status.as_u16(),
                body,
            });
        }

        // The body is not one JSON document; only line-delimited objects are
        // well-formed, so split on newlines and feed the reassembler.
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut acc = Reassembler::new();
        let mut receiving = false;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| AnalyzerError::Network(e.to_string()))?;
            buffer.extend_from_slice(&bytes);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes = buffer.drain(..=newline_pos).collect::<Vec<_>>();
                match std::str::from_utf8(&line_bytes) {
                    Ok(line) => {
                        if acc.push_line(line) && !receiving {
                            receiving = true;
                            if let Some(notify) = progress {
                                notify(0.75, "Receiving description");
                            }
                        }
                    }
                    Err(e) => log::debug!("skipping non-UTF-8 stream line: {e}"),
                }
            }
        }

        // A last line without a trailing newline still counts
        if let Ok(line) = std::str::from_utf8(&buffer) {
            acc.push_line(line);
        }

        Ok(acc.finish())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
