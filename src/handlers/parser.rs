//! Best-effort extraction of the four result fields from free text.
//!
//! Every field is matched on its own, anchored at the start of a line. A field
//! that is missing or malformed is simply `None`; parsing never fails.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::ParsedResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseField {
    DishName,
    Ingredients,
    CaloriesPerIngredient,
    TotalCalories,
}

impl ResponseField {
    const ALL: [ResponseField; 4] = [
        ResponseField::DishName,
        ResponseField::Ingredients,
        ResponseField::CaloriesPerIngredient,
        ResponseField::TotalCalories,
    ];

    fn pattern(&self) -> &'static str {
        match self {
            ResponseField::DishName => r"(?m)^[ \t]*Dish Name:[ \t]*(.+)$",
            ResponseField::Ingredients => r"(?m)^[ \t]*Ingredients:[ \t]*(.+)$",
            ResponseField::CaloriesPerIngredient => r"(?m)^[ \t]*Calories Per Ingredient:[ \t]*(.+)$",
            // Digits only. The prompt asks for "Total Calories Per Serving:",
            // which this does not match.
            ResponseField::TotalCalories => r"(?m)^[ \t]*Total Calories:[ \t]*(\d+)",
        }
    }
}

fn field_patterns() -> &'static [(ResponseField, Regex)] {
    static PATTERNS: OnceLock<Vec<(ResponseField, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ResponseField::ALL
            .iter()
            .filter_map(|field| match Regex::new(field.pattern()) {
                Ok(re) => Some((*field, re)),
                Err(e) => {
                    log::error!("Invalid pattern for {:?}: {}", field, e);
                    None
                }
            })
            .collect()
    })
}

fn extract(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_response(text: &str) -> ParsedResult {
    let mut parsed = ParsedResult::default();

    for (field, re) in field_patterns() {
        let value = extract(re, text);
        match field {
            ResponseField::DishName => parsed.dish_name = value,
            ResponseField::Ingredients => parsed.ingredients = value,
            ResponseField::CaloriesPerIngredient => parsed.calories_per_ingredient = value,
            ResponseField::TotalCalories => parsed.total_calories = value,
        }
    }

    let found = [
        &parsed.dish_name,
        &parsed.ingredients,
        &parsed.calories_per_ingredient,
        &parsed.total_calories,
    ]
    .iter()
    .filter(|v| v.is_some())
    .count();
    if found < ResponseField::ALL.len() {
        log::warn!("Extracted {}/{} fields from response", found, ResponseField::ALL.len());
    }

    parsed
}
