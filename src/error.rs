use thiserror::Error;

/// Failures that stop the process before it can serve a single upload.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{0} must be set in the environment or .env file")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("classifier initialization failed: {0}")]
    ClassifierInit(String),
}

/// Failures of a single analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported upload type: {0}")]
    UnsupportedType(String),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("no confident food labels found")]
    NoLabelFound,

    #[error("{service} call failed: {source}")]
    ServiceCall {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Structural problems are shown to the user as a warning instead of
    /// failing the request.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnsupportedType(_) | AnalysisError::Decode(_) | AnalysisError::NoLabelFound
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::UnsupportedType(kind) => {
                format!("⚠️ Unsupported file type ({}). Please upload a JPG or PNG image.", kind)
            }
            AnalysisError::Decode(_) => {
                "⚠️ Could not read the uploaded file as an image.".to_string()
            }
            AnalysisError::NoLabelFound => "⚠️ No confident food labels found.".to_string(),
            AnalysisError::ServiceCall { service, .. } => {
                format!("❌ The {} service is unavailable right now. Please try again.", service)
            }
            AnalysisError::Io(_) => "❌ Could not prepare the image for analysis.".to_string(),
        }
    }
}
