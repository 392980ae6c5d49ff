// Hosted OpenAI-compatible adapter - single buffered chat completion

use super::VisionBackend;
use crate::config::OpenAiConfig;
use crate::error::{AnalyzerError, Result};
use crate::types::{BackendKind, ProgressFn};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Text part accompanying the images in the user message
const USER_REQUEST: &str = "Describe the object shown in the attached images.";

pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Media type from magic bytes; the data URI has to name it
fn detect_media_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

fn data_uri(bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{b64}", detect_media_type(bytes))
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl VisionBackend for OpenAiBackend {
    async fn describe(
        &self,
        images: &[Vec<u8>],
        prompt: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<String> {
        let api_key = self.config.resolve_api_key()?;

        let mut parts = vec![ContentPart::Text {
            text: USER_REQUEST.to_string(),
        }];
        for image in images {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_uri(image),
                },
            });
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(prompt),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
        };

        if let Some(notify) = progress {
            notify(0.5, "Sending images to the hosted model");
        }
        log::debug!(
            "POST {}/chat/completions model={} images={}",
            self.config.base_url,
            self.config.model,
            images.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api {
                backend: "OpenAI",
                status: status.as_u16(),
                body,
            });
        }

        // One complete message, no incremental reassembly on this path
        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AnalyzerError::Parse("response contained no choices".to_string()))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Hosted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_detection() {
        assert_eq!(detect_media_type(b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(detect_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_data_uri_prefix() {
        let uri = data_uri(&[0xFF, 0xD8, 0xFF]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_content_part_wire_shape() {
        let part = ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/png;base64,AA==".to_string(),
            },
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "image_url");
        assert_eq!(value["image_url"]["url"], "data:image/png;base64,AA==");

        let text = ContentPart::Text {
            text: "hi".to_string(),
        };
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_system_message_is_plain_text() {
        let message = ChatMessage {
            role: "system",
            content: MessageContent::Text("the prompt"),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"], "the prompt");
    }
}
