//! HTTP handlers for product nutrition lookup

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::AppState;
use shared::{validate_barcode, NutritionRecord};

/// Query parameters for product search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    10
}

/// Get nutrition data for a barcode
pub async fn get_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<NutritionRecord>> {
    let barcode = validate_barcode(&barcode).map_err(|e| AppError::validation("barcode", e))?;
    let record = state.nutrition_service().lookup(&barcode).await?;
    Ok(Json(record))
}

/// Search products by name
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<NutritionRecord>>> {
    if !(1..=50).contains(&query.max_results) {
        return Err(AppError::validation(
            "max_results",
            "max_results must be between 1 and 50",
        ));
    }

    let records = state
        .nutrition_service()
        .search(&query.q, query.max_results)
        .await?;
    Ok(Json(records))
}
