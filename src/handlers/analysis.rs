use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AnalysisError;
use crate::handlers::parser::parse_response;
use crate::handlers::presenter::{present, Page};
use crate::handlers::prompt::build_prompt;
use crate::handlers::upload::Upload;
use crate::models::{AnalysisReport, AnalysisStatus, ParsedResult};
use crate::services::{ClassifierHandle, TextGenerator};

/// Only the best label is sent to the text service.
const TOP_LABELS: usize = 1;

/// Runs one upload through classify → prompt → generate → parse → present.
pub struct AnalysisPipeline {
    classifier: ClassifierHandle,
    generator: Arc<dyn TextGenerator>,
    upload_tmp_dir: PathBuf,
    // One analysis at a time
    turn: Mutex<()>,
}

impl AnalysisPipeline {
    pub fn new(
        classifier: ClassifierHandle,
        generator: Arc<dyn TextGenerator>,
        upload_tmp_dir: PathBuf,
    ) -> Self {
        Self {
            classifier,
            generator,
            upload_tmp_dir,
            turn: Mutex::new(()),
        }
    }

    /// Decode and empty-label problems come back as a report with a warning.
    /// Service failures, after one retry, come back as `Err`.
    pub async fn analyze(&self, upload: Upload) -> Result<AnalysisReport, AnalysisError> {
        let _turn = self.turn.lock().await;

        log::info!(
            "📨 New upload: {:?} ({:?}, {} bytes)",
            upload.file_name,
            upload.content_type,
            upload.bytes.len()
        );

        let mut page = Page::new();
        let mut labels = Vec::new();

        match self.run(upload, &mut page, &mut labels).await {
            Ok(parsed) => {
                log::info!("✅ Analysis completed for labels {:?}", labels);
                Ok(page.finish(AnalysisStatus::Completed, labels, Some(parsed)))
            }
            Err(err) if err.is_warning() => {
                log::warn!("⚠️ Upload rejected: {}", err);
                page.warning(err.user_message());
                Ok(page.finish(AnalysisStatus::Warning, labels, None))
            }
            Err(err) => {
                log::error!("❌ Analysis failed: {}", err);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        upload: Upload,
        page: &mut Page,
        labels: &mut Vec<String>,
    ) -> Result<ParsedResult, AnalysisError> {
        let image = upload.decode()?;
        let (width, height) = image.dimensions();
        log::info!(
            "🖼️ Decoded {} upload {:?}: {}x{}",
            image.format(),
            image.file_name().unwrap_or("<unnamed>"),
            width,
            height
        );
        page.image(image.preview_data_url(), "Uploaded Image");

        // Dropped at the end of this scope, which deletes the file
        let temp_copy = image.write_temp_copy(&self.upload_tmp_dir)?;
        let classification = call_with_retry("classifier", || {
            self.classifier.classify(temp_copy.path())
        })
        .await?;

        if classification.is_empty() {
            return Err(AnalysisError::NoLabelFound);
        }
        *labels = classification.top_labels(TOP_LABELS);
        page.labels(labels);

        let prompt = build_prompt(labels);
        page.spinner("Giving Calorie Info ....");
        let output = call_with_retry("text generation", || self.generator.generate(&prompt)).await?;

        let parsed = parse_response(output.trim());
        present(&parsed, page);

        Ok(parsed)
    }
}

/// Calls an external service, retrying once on failure.
async fn call_with_retry<T, F, Fut>(service: &'static str, mut call: F) -> Result<T, AnalysisError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match call().await {
        Ok(value) => Ok(value),
        Err(first) => {
            log::warn!("🔁 {} call failed, retrying once: {}", service, first);
            call()
                .await
                .map_err(|source| AnalysisError::ServiceCall { service, source })
        }
    }
}
