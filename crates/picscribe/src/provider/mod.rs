//! Captioning capability.
//!
//! The pipeline treats captioning as an opaque, potentially failing
//! dependency behind the [`CaptionProvider`] trait: image payload plus
//! prompt in, caption text out. [`OpenAiCaptionProvider`] speaks an
//! OpenAI-compatible vision chat endpoint; [`CannedCaptionProvider`]
//! answers from a fixed template for tests and offline runs.

pub mod openai;

use crate::error::ProviderError;

pub use openai::OpenAiCaptionProvider;

/// Image bytes plus the MIME type guessed from the source path.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// External vision-to-text capability.
///
/// Implementations are invoked at most once per pending record per
/// run. The model name is persisted alongside each caption for
/// provenance.
pub trait CaptionProvider {
    /// Identifier persisted with each result.
    fn model(&self) -> &str;

    /// Produces a caption for the image, or fails. An empty caption is
    /// a failure; callers rely on success implying non-empty text.
    fn caption(&self, image: &ImagePayload, prompt: &str) -> Result<String, ProviderError>;
}

/// Deterministic provider that answers from a fixed template, without
/// network access. Useful for tests and dry runs against real trees.
pub struct CannedCaptionProvider {
    model: String,
    template: String,
}

impl CannedCaptionProvider {
    /// `template` may contain `{bytes}`, replaced with the payload size.
    pub fn new(model: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            template: template.into(),
        }
    }
}

impl CaptionProvider for CannedCaptionProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn caption(&self, image: &ImagePayload, _prompt: &str) -> Result<String, ProviderError> {
        let text = self
            .template
            .replace("{bytes}", &image.bytes.len().to_string());
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCaption);
        }
        Ok(text)
    }
}
