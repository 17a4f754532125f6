use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::AnalysisError;
use crate::handlers::presenter::{render_page, Page};
use crate::handlers::{AnalysisPipeline, Upload};
use crate::models::AnalysisReport;

/// Multipart field carrying the photo.
const UPLOAD_FIELD: &str = "image";

pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

pub fn create_router(pipeline: Arc<AnalysisPipeline>, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { pipeline });

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_page_handler))
        .route("/api/analyze", post(analyze_api_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

/// Picks the `image` field, or the first file field if it is named
/// differently. An empty file input counts as no upload.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let is_upload = field.name() == Some(UPLOAD_FIELD) || field.file_name().is_some();
        if !is_upload {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty());
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.is_empty() && file_name.is_none() {
            return Ok(None);
        }

        return Ok(Some(Upload {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        }));
    }

    Ok(None)
}

fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::ServiceCall { .. } => StatusCode::BAD_GATEWAY,
        AnalysisError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

enum Submission {
    Report(AnalysisReport),
    Rejected(StatusCode, String),
}

async fn submit(state: &AppState, multipart: Multipart) -> Submission {
    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return Submission::Rejected(
                StatusCode::BAD_REQUEST,
                "Please choose a JPG or PNG image to upload.".to_string(),
            );
        }
        Err(e) => {
            log::error!("❌ Failed to read multipart upload: {}", e);
            return Submission::Rejected(e.status(), format!("Could not read the upload: {}", e.body_text()));
        }
    };

    match state.pipeline.analyze(upload).await {
        Ok(report) => Submission::Report(report),
        Err(e) => Submission::Rejected(error_status(&e), e.user_message()),
    }
}

async fn analyze_page_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    match submit(&state, multipart).await {
        Submission::Report(report) => (StatusCode::OK, Html(render_page(&report.directives))),
        Submission::Rejected(status, message) => {
            let mut page = Page::new();
            page.error(message);
            (status, Html(render_page(page.directives())))
        }
    }
}

async fn analyze_api_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> (StatusCode, Json<serde_json::Value>) {
    match submit(&state, multipart).await {
        Submission::Report(report) => match serde_json::to_value(&report) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                log::error!("❌ Failed to serialize report: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "error", "message": "serialization failed" })),
                )
            }
        },
        Submission::Rejected(status, message) => {
            (status, Json(json!({ "status": "error", "message": message })))
        }
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health_check() -> &'static str {
    "OK"
}
