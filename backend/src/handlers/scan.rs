//! HTTP handlers for barcode scanning

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::AppState;
use shared::{validate_age_group, AgeGroup, ScannedProduct};

/// Input for scanning a product
#[derive(Debug, Deserialize)]
pub struct ScanProductInput {
    pub barcode: String,
    pub age_group: Option<String>,
}

/// Look up, grade and record a scanned barcode
pub async fn scan_product(
    State(state): State<AppState>,
    Json(input): Json<ScanProductInput>,
) -> AppResult<Json<ScannedProduct>> {
    // Scans come from the age picker, so unknown labels are rejected here
    let age_group = match input.age_group.as_deref() {
        Some(label) => {
            validate_age_group(label).map_err(|e| AppError::validation("age_group", e))?
        }
        None => AgeGroup::DEFAULT,
    };

    let product = state
        .scan_service()
        .scan(&input.barcode, age_group.as_str())
        .await?;
    Ok(Json(product))
}
