use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::StartupError;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_CLASSIFIER_MODEL: &str = "nateraw/vit-base-food101";
const DEFAULT_CLASSIFIER_API_URL: &str = "https://router.huggingface.co/hf-inference/models";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model: String,
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub classifier: ClassifierConfig,
    pub bind_addr: String,
    pub upload_tmp_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up
    /// a local `.env` file.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(StartupError::MissingCredential("GEMINI_API_KEY"))?;

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_positive::<u64>("REQUEST_TIMEOUT_SECS", raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let timeout = Duration::from_secs(timeout_secs);

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => parse_positive::<usize>("MAX_UPLOAD_BYTES", raw)?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let upload_tmp_dir = get("UPLOAD_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_url: get("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
                timeout,
            },
            classifier: ClassifierConfig {
                model: get("CLASSIFIER_MODEL").unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
                api_url: get("CLASSIFIER_API_URL")
                    .unwrap_or_else(|| DEFAULT_CLASSIFIER_API_URL.to_string()),
                api_token: get("HF_API_TOKEN"),
                timeout,
            },
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            upload_tmp_dir,
            max_upload_bytes,
        })
    }
}

fn parse_positive<T>(key: &'static str, raw: String) -> Result<T, StartupError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(StartupError::InvalidConfig { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(
            result,
            Err(StartupError::MissingCredential("GEMINI_API_KEY"))
        ));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let result = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")]));
        assert!(matches!(result, Err(StartupError::MissingCredential(_))));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();

        assert_eq!(config.gemini.api_key, "secret");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.classifier.model, "nateraw/vit-base-food101");
        assert!(config.classifier.api_token.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.gemini.timeout, Duration::from_secs(60));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("HF_API_TOKEN", "hf_token"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("UPLOAD_TMP_DIR", "/tmp/uploads"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.classifier.api_token.as_deref(), Some("hf_token"));
        assert_eq!(config.classifier.timeout, Duration::from_secs(5));
        assert_eq!(config.upload_tmp_dir, PathBuf::from("/tmp/uploads"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for bad in ["zero", "0", "-3"] {
            let result = Config::from_lookup(lookup_from(&[
                ("GEMINI_API_KEY", "secret"),
                ("REQUEST_TIMEOUT_SECS", bad),
            ]));
            assert!(
                matches!(result, Err(StartupError::InvalidConfig { key: "REQUEST_TIMEOUT_SECS", .. })),
                "{} should be rejected",
                bad
            );
        }
    }
}
