use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::ImageClassifier;
use crate::config::ClassifierConfig;
use crate::error::StartupError;
use crate::models::{ClassificationResult, Prediction};

/// Shared handle to the loaded classifier.
pub type ClassifierHandle = Arc<dyn ImageClassifier>;

type ClassifierFactory = Box<dyn Fn() -> Result<ClassifierHandle> + Send + Sync>;

/// Builds the classifier on first use and hands out the same handle for the
/// rest of the process lifetime.
pub struct ModelLoader {
    factory: ClassifierFactory,
    handle: OnceCell<ClassifierHandle>,
}

impl ModelLoader {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<ClassifierHandle> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            handle: OnceCell::new(),
        }
    }

    pub fn hugging_face(config: ClassifierConfig) -> Self {
        Self::new(move || {
            let classifier = HuggingFaceClassifier::new(&config)?;
            log::info!("🔗 Classifier endpoint: {}", classifier.endpoint());
            Ok(Arc::new(classifier) as ClassifierHandle)
        })
    }

    /// Concurrent first calls wait for a single initialization.
    pub async fn load_classifier(&self) -> Result<ClassifierHandle, StartupError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                log::info!("⏳ Loading classifier model...");
                (self.factory)().map_err(|e| StartupError::ClassifierInit(e.to_string()))
            })
            .await?;

        Ok(handle.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Predictions(Vec<Prediction>),
    Error { error: String },
}

/// Hugging Face Inference API client for image-classification models.
pub struct HuggingFaceClassifier {
    endpoint: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let model = config.model.trim();
        if model.is_empty() || model.contains(char::is_whitespace) {
            anyhow::bail!("invalid classifier model id: {:?}", config.model);
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            endpoint: format!("{}/{}", config.api_url.trim_end_matches('/'), model),
            api_token: config.api_token.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_response(body: &str) -> Result<ClassificationResult> {
        match serde_json::from_str::<InferenceResponse>(body)? {
            InferenceResponse::Predictions(predictions) => Ok(ClassificationResult::new(predictions)),
            InferenceResponse::Error { error } => anyhow::bail!("classifier error: {}", error),
        }
    }
}

#[async_trait::async_trait]
impl ImageClassifier for HuggingFaceClassifier {
    async fn classify(&self, image_path: &Path) -> Result<ClassificationResult> {
        let image_data = tokio::fs::read(image_path).await?;
        log::debug!(
            "📸 Classifying {} ({} bytes)",
            image_path.display(),
            image_data.len()
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "image/jpeg")
            .header("x-wait-for-model", "true")
            .body(image_data);

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        log::debug!("📥 Classifier response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            log::error!("❌ Classifier API error response: {}", body);
            anyhow::bail!("Classifier API error ({}): {}", status, body);
        }

        let result = Self::parse_response(&body)?;
        log::info!(
            "🏷️ Classifier returned {} labels",
            result.predictions().len()
        );

        Ok(result)
    }
}
