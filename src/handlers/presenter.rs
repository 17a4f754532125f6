use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{AnalysisReport, AnalysisStatus, DisplayDirective, ParsedResult};

pub const PAGE_TITLE: &str = "🍽️ Food Image → Dish, Ingredients & Calories";

/// Collects display directives for one request, in order.
#[derive(Debug)]
pub struct Page {
    directives: Vec<DisplayDirective>,
}

impl Page {
    pub fn new() -> Self {
        Self {
            directives: vec![DisplayDirective::Title {
                text: PAGE_TITLE.to_string(),
            }],
        }
    }

    pub fn push(&mut self, directive: DisplayDirective) {
        self.directives.push(directive);
    }

    pub fn spinner(&mut self, text: &str) {
        self.push(DisplayDirective::Spinner {
            text: text.to_string(),
        });
    }

    pub fn image(&mut self, data_url: String, caption: &str) {
        self.push(DisplayDirective::Image {
            data_url,
            caption: caption.to_string(),
        });
    }

    pub fn labels(&mut self, labels: &[String]) {
        self.push(DisplayDirective::Labels {
            labels: labels.to_vec(),
        });
    }

    pub fn warning(&mut self, text: String) {
        self.push(DisplayDirective::Warning { text });
    }

    pub fn error(&mut self, text: String) {
        self.push(DisplayDirective::Error { text });
    }

    pub fn directives(&self) -> &[DisplayDirective] {
        &self.directives
    }

    pub fn finish(
        self,
        status: AnalysisStatus,
        labels: Vec<String>,
        result: Option<ParsedResult>,
    ) -> AnalysisReport {
        AnalysisReport {
            status,
            labels,
            result,
            directives: self.directives,
            analyzed_at: Utc::now(),
        }
    }
}

/// Shows the four fields, falling back to the placeholder for each one the
/// parser did not find.
pub fn present(parsed: &ParsedResult, page: &mut Page) {
    page.push(DisplayDirective::Heading {
        text: "✅ Final Result".to_string(),
    });

    let fields = [
        ("🍽️ Dish Name", parsed.dish_name_or_placeholder()),
        ("🧾 Ingredients", parsed.ingredients_or_placeholder()),
        ("🔥 Calories Per Ingredient", parsed.calories_per_ingredient_or_placeholder()),
        ("🔥 Total Calories", parsed.total_calories_or_placeholder()),
    ];

    for (label, value) in fields {
        page.push(DisplayDirective::Field {
            label: label.to_string(),
            value: value.to_string(),
        });
    }
}

fn render_directive(directive: &DisplayDirective, html: &mut String) {
    match directive {
        DisplayDirective::Title { text } => {
            html.push_str(&format!("<h1>{}</h1>\n", encode_text(text)));
        }
        DisplayDirective::Spinner { text } => {
            html.push_str(&format!("<p class=\"status\">{}</p>\n", encode_text(text)));
        }
        DisplayDirective::Image { data_url, caption } => {
            html.push_str(&format!(
                "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>\n",
                encode_double_quoted_attribute(data_url),
                encode_double_quoted_attribute(caption),
                encode_text(caption)
            ));
        }
        DisplayDirective::Labels { labels } => {
            html.push_str(&format!(
                "<p><strong>🧠 Top labels:</strong> {}</p>\n",
                encode_text(&labels.join(", "))
            ));
        }
        DisplayDirective::Heading { text } => {
            html.push_str(&format!("<h3>{}</h3>\n", encode_text(text)));
        }
        DisplayDirective::Field { label, value } => {
            html.push_str(&format!(
                "<p class=\"field\"><strong>{}:</strong> {}</p>\n",
                encode_text(label),
                encode_text(value)
            ));
        }
        DisplayDirective::Warning { text } => {
            html.push_str(&format!("<div class=\"warning\">{}</div>\n", encode_text(text)));
        }
        DisplayDirective::Error { text } => {
            html.push_str(&format!("<div class=\"error\">{}</div>\n", encode_text(text)));
        }
    }
}

/// Renders directives as a standalone HTML page.
pub fn render_page(directives: &[DisplayDirective]) -> String {
    let mut body = String::new();
    for directive in directives {
        render_directive(directive, &mut body);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Food Image Analysis</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 760px; margin: 2em auto; padding: 0 1em; color: #222; }}
img {{ max-width: 100%; border-radius: 8px; }}
figcaption {{ color: #666; font-size: 0.9em; text-align: center; }}
.status {{ color: #888; font-size: 0.85em; }}
.warning {{ background: #fff8e1; border: 1px solid #ffcc80; padding: 0.8em; border-radius: 6px; }}
.error {{ background: #fdecea; border: 1px solid #f5a097; padding: 0.8em; border-radius: 6px; }}
</style>
</head>
<body>
{}<p><a href="/">Upload another image</a></p>
</body>
</html>
"#,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(page: &Page) -> Vec<(String, String)> {
        page.directives()
            .iter()
            .filter_map(|d| match d {
                DisplayDirective::Field { label, value } => Some((label.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_starts_with_title() {
        let page = Page::new();
        assert_eq!(
            page.directives(),
            &[DisplayDirective::Title {
                text: PAGE_TITLE.to_string()
            }]
        );
    }

    #[test]
    fn test_present_full_result() {
        let parsed = ParsedResult {
            dish_name: Some("Pizza".to_string()),
            ingredients: Some("cheese, dough".to_string()),
            calories_per_ingredient: Some("200, 150".to_string()),
            total_calories: Some("500".to_string()),
        };
        let mut page = Page::new();
        present(&parsed, &mut page);

        let values: Vec<String> = fields(&page).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["Pizza", "cheese, dough", "200, 150", "500"]);
    }

    #[test]
    fn test_present_uses_placeholder_per_field() {
        let parsed = ParsedResult {
            ingredients: Some("rice".to_string()),
            ..Default::default()
        };
        let mut page = Page::new();
        present(&parsed, &mut page);

        let fields = fields(&page);
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], ("🍽️ Dish Name".to_string(), "N/A".to_string()));
        assert_eq!(fields[1].1, "rice");
        assert_eq!(fields[2].1, "N/A");
        assert_eq!(fields[3], ("🔥 Total Calories".to_string(), "N/A".to_string()));
    }

    #[test]
    fn test_render_escapes_model_output() {
        let directives = vec![DisplayDirective::Field {
            label: "🍽️ Dish Name".to_string(),
            value: "<script>alert(1)</script>".to_string(),
        }];
        let html = render_page(&directives);

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_labels_and_warning() {
        let mut page = Page::new();
        page.labels(&["pizza".to_string()]);
        page.warning("⚠️ No confident food labels found.".to_string());
        let html = render_page(page.directives());

        assert!(html.contains("<h1>🍽️ Food Image → Dish, Ingredients &amp; Calories</h1>"));
        assert!(html.contains("<strong>🧠 Top labels:</strong> pizza"));
        assert!(html.contains("<div class=\"warning\">⚠️ No confident food labels found.</div>"));
    }
}
