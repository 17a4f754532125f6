use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Google Gemini `generateContent` client.
pub struct GeminiService {
    api_key: String,
    model: String,
    api_url: String,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_url, self.model)
    }

    fn build_request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }

    /// Joins the text parts of the first candidate.
    fn extract_text(body: &str) -> Result<String> {
        let response: GenerateResponse = serde_json::from_str(body)?;

        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;

        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();

        Ok(text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = Self::build_request(prompt);

        log::info!("🤖 Sending request to Gemini with model: {}", self.model);
        log::debug!("📤 Prompt size: {} bytes", prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Gemini API error response: {}", error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let body = response.text().await?;
        log::debug!("📄 Raw Gemini response size: {} bytes", body.len());

        let text = Self::extract_text(&body)?;
        log::info!("💬 Gemini response content: {}", text);

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> GeminiConfig {
        GeminiConfig {
            api_key: "test_key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_url: "https://example.test/v1beta/models/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint() {
        let service = GeminiService::new(&test_config()).unwrap();
        assert_eq!(
            service.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(service.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_request_is_role_tagged() {
        let request = GeminiService::build_request("Given these possible food labels: pizza");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Given these possible food labels: pizza"
        );
    }

    #[test]
    fn test_extract_text_joins_and_trims() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "\n  Dish Name: Pizza\n"},
                        {"text": "Total Calories: 500  \n"}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;

        let text = GeminiService::extract_text(body).unwrap();
        assert_eq!(text, "Dish Name: Pizza\nTotal Calories: 500");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(GeminiService::extract_text(body).is_err());
    }
}
