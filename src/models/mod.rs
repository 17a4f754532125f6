use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in place of any field the text service did not return.
pub const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Jpeg,
    Png,
}

impl UploadFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            UploadFormat::Jpeg => "image/jpeg",
            UploadFormat::Png => "image/png",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(UploadFormat::Jpeg),
            "image/png" => Some(UploadFormat::Png),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = name.rsplit_once('.')?.1.to_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" => Some(UploadFormat::Jpeg),
            "png" => Some(UploadFormat::Png),
            _ => None,
        }
    }
}

impl std::fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UploadFormat::Jpeg => "jpeg",
            UploadFormat::Png => "png",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Classifier output, highest score first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    /// Orders by descending score. The sort is stable, so equal scores keep
    /// the order the service returned them in.
    pub fn new(mut predictions: Vec<Prediction>) -> Self {
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { predictions }
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn top_labels(&self, k: usize) -> Vec<String> {
        self.predictions
            .iter()
            .take(k)
            .map(|p| p.label.clone())
            .collect()
    }
}

/// The four fields pulled out of the text service reply. Any of them may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub dish_name: Option<String>,
    pub ingredients: Option<String>,
    pub calories_per_ingredient: Option<String>,
    pub total_calories: Option<String>,
}

impl ParsedResult {
    pub fn dish_name_or_placeholder(&self) -> &str {
        self.dish_name.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn ingredients_or_placeholder(&self) -> &str {
        self.ingredients.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn calories_per_ingredient_or_placeholder(&self) -> &str {
        self.calories_per_ingredient.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn total_calories_or_placeholder(&self) -> &str {
        self.total_calories.as_deref().unwrap_or(PLACEHOLDER)
    }
}

/// One instruction for the page shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayDirective {
    Title { text: String },
    Spinner { text: String },
    Image { data_url: String, caption: String },
    Labels { labels: Vec<String> },
    Heading { text: String },
    Field { label: String, value: String },
    Warning { text: String },
    Error { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Completed,
    Warning,
}

/// Everything produced for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub status: AnalysisStatus,
    pub labels: Vec<String>,
    pub result: Option<ParsedResult>,
    pub directives: Vec<DisplayDirective>,
    pub analyzed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, score: f32) -> Prediction {
        Prediction {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_classification_sorted_by_score() {
        let result = ClassificationResult::new(vec![
            prediction("sushi", 0.1),
            prediction("pizza", 0.8),
            prediction("ramen", 0.1),
        ]);

        assert_eq!(result.top_labels(1), vec!["pizza"]);
        // Ties keep the service order
        assert_eq!(result.top_labels(3), vec!["pizza", "sushi", "ramen"]);
    }

    #[test]
    fn test_top_labels_of_empty_result() {
        let result = ClassificationResult::new(Vec::new());
        assert!(result.is_empty());
        assert!(result.top_labels(1).is_empty());
    }

    #[test]
    fn test_upload_format_detection() {
        assert_eq!(UploadFormat::from_mime("image/jpg"), Some(UploadFormat::Jpeg));
        assert_eq!(UploadFormat::from_mime("IMAGE/PNG"), Some(UploadFormat::Png));
        assert_eq!(UploadFormat::from_mime("image/gif"), None);
        assert_eq!(UploadFormat::from_file_name("lunch.JPEG"), Some(UploadFormat::Jpeg));
        assert_eq!(UploadFormat::from_file_name("plate.png"), Some(UploadFormat::Png));
        assert_eq!(UploadFormat::from_file_name("notes.txt"), None);
        assert_eq!(UploadFormat::from_file_name("no_extension"), None);
    }

    #[test]
    fn test_placeholders() {
        let parsed = ParsedResult {
            dish_name: Some("Pizza".to_string()),
            ..Default::default()
        };
        assert_eq!(parsed.dish_name_or_placeholder(), "Pizza");
        assert_eq!(parsed.ingredients_or_placeholder(), "N/A");
        assert_eq!(parsed.calories_per_ingredient_or_placeholder(), "N/A");
        assert_eq!(parsed.total_calories_or_placeholder(), "N/A");
    }

    #[test]
    fn test_directive_json_shape() {
        let directive = DisplayDirective::Field {
            label: "🍽️ Dish Name".to_string(),
            value: "Pizza".to_string(),
        };
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["kind"], "field");
        assert_eq!(json["value"], "Pizza");
    }
}
