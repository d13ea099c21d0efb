//! Product nutrition models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Nutrition facts per serving
///
/// Values the upstream database does not report are zero, so the grading
/// engine treats "unknown" and "zero" the same way.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NutritionFacts {
    /// kcal
    pub calories: Decimal,
    /// g
    pub total_fat: Decimal,
    /// g
    pub saturated_fat: Decimal,
    /// g
    pub trans_fat: Decimal,
    /// mg
    pub cholesterol: Decimal,
    /// mg
    pub sodium: Decimal,
    /// g
    pub total_carbohydrates: Decimal,
    /// g
    pub dietary_fiber: Decimal,
    /// g
    pub total_sugars: Decimal,
    /// g
    pub added_sugars: Decimal,
    /// g
    pub protein: Decimal,
    pub vitamin_d: Decimal,
    pub calcium: Decimal,
    pub iron: Decimal,
    /// mg
    pub potassium: Decimal,
}

/// Snapshot of a product's nutrition data at lookup time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionRecord {
    /// Empty for name-search results
    #[serde(default)]
    pub barcode: String,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub serving_size: String,
    #[serde(default)]
    pub nutrition_facts: NutritionFacts,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub retrieved_at: DateTime<Utc>,
}

impl NutritionRecord {
    /// Record with no reported nutrition, as returned by a name search
    pub fn summary(product_name: String, brand_name: Option<String>) -> Self {
        Self {
            barcode: String::new(),
            product_name,
            brand_name,
            serving_size: "Per serving".to_string(),
            nutrition_facts: NutritionFacts::default(),
            ingredients: Vec::new(),
            allergens: Vec::new(),
            retrieved_at: Utc::now(),
        }
    }
}
