//! WebAssembly module for Little Bites
//!
//! Lets the app grade products on-device when the backend is unreachable:
//! - Product grading against the built-in or supplied criteria
//! - Barcode validation before a lookup is attempted
//! - Score to letter grade banding

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Grade a nutrition record given as JSON, returning the grade as JSON
///
/// `criteria_json` replaces the built-in criteria when present.
#[wasm_bindgen]
pub fn grade_product_json(
    nutrition_json: &str,
    age_group: &str,
    criteria_json: Option<String>,
) -> Result<String, JsValue> {
    grade_json(nutrition_json, age_group, criteria_json.as_deref()).map_err(to_js_error)
}

/// Built-in grading criteria as JSON
#[wasm_bindgen]
pub fn default_criteria_json() -> Result<String, JsValue> {
    serde_json::to_string(&GradingCriteria::default()).map_err(|e| to_js_error(e.to_string()))
}

/// Normalize a scanned barcode, failing with the reason it was rejected
#[wasm_bindgen]
pub fn check_barcode(barcode: &str) -> Result<String, JsValue> {
    validate_barcode(barcode).map_err(|e| to_js_error(e.to_string()))
}

/// Letter grade for a numeric score
#[wasm_bindgen]
pub fn classify_score(score: f64) -> String {
    let decimal_score = Decimal::try_from(score).unwrap_or(Decimal::ZERO);
    shared::grade_for_score(decimal_score).to_string()
}

/// Selectable age groups as JSON `[{ "value": ..., "label": ... }]`
#[wasm_bindgen]
pub fn age_groups_json() -> Result<String, JsValue> {
    serde_json::to_string(&AgeGroup::options()).map_err(|e| to_js_error(e.to_string()))
}

fn grade_json(
    nutrition_json: &str,
    age_group: &str,
    criteria_json: Option<&str>,
) -> Result<String, String> {
    let nutrition: NutritionRecord = serde_json::from_str(nutrition_json)
        .map_err(|e| format!("Invalid nutrition JSON: {}", e))?;

    let criteria = match criteria_json {
        Some(json) => serde_json::from_str::<GradingCriteria>(json)
            .map_err(|e| format!("Invalid criteria JSON: {}", e))?,
        None => GradingCriteria::default(),
    };

    if age_group.parse::<AgeGroup>().is_err() {
        warn(&format!(
            "Unknown age group {}, grading with {} thresholds",
            age_group,
            AgeGroup::DEFAULT
        ));
    }

    let grade = shared::grade_product(&nutrition, age_group, &criteria).map_err(|e| e.to_string())?;
    serde_json::to_string(&grade).map_err(|e| e.to_string())
}

fn to_js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    const PUREE: &str = r#"{
        "barcode": "036000291452",
        "product_name": "Banana Puree",
        "serving_size": "1 pouch (113g)",
        "nutrition_facts": {
            "calories": "90",
            "total_sugars": "12",
            "sodium": "5",
            "protein": "2",
            "dietary_fiber": "2"
        },
        "ingredients": ["bananas", "ascorbic acid"],
        "retrieved_at": "2025-03-01T12:00:00Z"
    }"#;

    #[test]
    fn test_grade_product_json() {
        let json = grade_json(PUREE, "6-12months", None).unwrap();
        let grade: ProductGrade = serde_json::from_str(&json).unwrap();

        // 12g sugar is twice the 6g limit
        assert_eq!(grade.highlights.len(), 1);
        assert_eq!(grade.highlights[0].severity, Severity::High);
        assert_eq!(grade.score, Decimal::from(50));
        assert_eq!(grade.grade, LetterGrade::F);
    }

    #[test]
    fn test_grade_with_custom_criteria() {
        let mut criteria = GradingCriteria::default();
        for entry in &mut criteria.age_groups {
            entry.max_sugar = Decimal::from(20);
        }
        let criteria_json = serde_json::to_string(&criteria).unwrap();

        let json = grade_json(PUREE, "6-12months", Some(&criteria_json)).unwrap();
        let grade: ProductGrade = serde_json::from_str(&json).unwrap();
        assert_eq!(grade.grade, LetterGrade::A);
    }

    #[test]
    fn test_invalid_input() {
        let err = grade_json("{", "6-12months", None).unwrap_err();
        assert!(err.starts_with("Invalid nutrition JSON"));

        let err = grade_json(PUREE, "6-12months", Some("[]")).unwrap_err();
        assert!(err.starts_with("Invalid criteria JSON"));
    }

    #[test]
    fn test_classify_score() {
        assert_eq!(classify_score(95.0), "A");
        assert_eq!(classify_score(80.0), "B");
        assert_eq!(classify_score(72.5), "C");
        assert_eq!(classify_score(60.0), "D");
        assert_eq!(classify_score(12.0), "F");
    }

    #[test]
    fn test_age_group_options() {
        let options = AgeGroup::options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[0].label, "0-6 months");
        assert_eq!(options[3].value, AgeGroup::TwoToFiveYears);
    }
}
