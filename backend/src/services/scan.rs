//! Scan-to-result pipeline
//!
//! barcode -> nutrition lookup -> grading -> scan history. A failure at any
//! step aborts the scan and nothing is written to the history.

use crate::error::{AppError, AppResult};
use crate::services::{GradingService, HistoryService, NutritionService};
use shared::{validate_barcode, ScannedProduct};

/// Scan pipeline service
#[derive(Clone)]
pub struct ScanService {
    nutrition: NutritionService,
    grading: GradingService,
    history: HistoryService,
}

impl ScanService {
    /// Create a new ScanService instance
    pub fn new(
        nutrition: NutritionService,
        grading: GradingService,
        history: HistoryService,
    ) -> Self {
        Self {
            nutrition,
            grading,
            history,
        }
    }

    /// Scan a barcode, grade the product and record it in the history
    pub async fn scan(&self, barcode: &str, age_group: &str) -> AppResult<ScannedProduct> {
        let barcode = validate_barcode(barcode).map_err(|e| AppError::validation("barcode", e))?;

        tracing::info!(%barcode, age_group, "Scanning product");

        let nutrition = self.nutrition.lookup(&barcode).await?;
        let grade = self.grading.grade(&nutrition, age_group, None).await?;

        let product = ScannedProduct::new(barcode, nutrition, grade);
        let outcome = self.history.save(&product).await?;

        if outcome.evicted > 0 {
            tracing::info!(evicted = outcome.evicted, "Scan history trimmed to capacity");
        }

        Ok(product)
    }
}
