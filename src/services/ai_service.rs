use anyhow::Result;
use std::path::Path;

use crate::models::ClassificationResult;

/// Trait for image classifiers (Hugging Face, local models, etc.)
#[async_trait::async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classifies the image stored at `image_path`. Providers read from the
    /// filesystem, so callers hand over a temporary copy.
    async fn classify(&self, image_path: &Path) -> Result<ClassificationResult>;
}

/// Trait for text generation services (Gemini, OpenRouter, etc.)
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one prompt and returns the completion text, trimmed.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
