//! HTTP caption provider speaking an OpenAI-compatible vision chat
//! endpoint. The image travels inline as a base64 data URL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::error::ProviderError;

use super::{CaptionProvider, ImagePayload};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct OpenAiCaptionProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCaptionProvider {
    /// `endpoint` is the full chat-completions URL, e.g.
    /// `https://api.openai.com/v1/chat/completions`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        }
    }
}

impl CaptionProvider for OpenAiCaptionProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn caption(&self, image: &ImagePayload, prompt: &str) -> Result<String, ProviderError> {
        let data_url = format!(
            "data:{};base64,{}",
            image.mime,
            BASE64.encode(&image.bytes)
        );

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }]
        });

        debug!(
            "Requesting caption from {} (model {}, {} image bytes)",
            self.endpoint,
            self.model,
            image.bytes.len()
        );

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ProviderError::ResponseParse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyCaption);
        }

        Ok(text)
    }
}
