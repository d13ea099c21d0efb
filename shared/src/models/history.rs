//! Scan history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NutritionRecord, ProductGrade};

/// A graded product in the scan history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannedProduct {
    pub barcode: String,
    pub nutrition: NutritionRecord,
    pub grade: ProductGrade,
    pub scan_date: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl ScannedProduct {
    /// New history entry, not marked as favorite
    pub fn new(barcode: String, nutrition: NutritionRecord, grade: ProductGrade) -> Self {
        Self {
            barcode,
            nutrition,
            grade,
            scan_date: Utc::now(),
            is_favorite: false,
        }
    }
}
