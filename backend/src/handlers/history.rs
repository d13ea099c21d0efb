//! HTTP handlers for scan history endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::AppState;
use shared::ScannedProduct;

#[derive(Serialize)]
pub struct ClearHistoryResponse {
    pub deleted: u64,
}

/// List scan history, newest first
pub async fn list_history(State(state): State<AppState>) -> AppResult<Json<Vec<ScannedProduct>>> {
    let products = state.history_service().list().await?;
    Ok(Json(products))
}

/// List favorite products
pub async fn list_favorites(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ScannedProduct>>> {
    let products = state.history_service().list_favorites().await?;
    Ok(Json(products))
}

/// Get a scanned product by barcode
pub async fn get_scanned_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<ScannedProduct>> {
    let product = state.history_service().get(&barcode).await?;
    Ok(Json(product))
}

/// Toggle the favorite flag of a scanned product
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<ScannedProduct>> {
    let product = state.history_service().toggle_favorite(&barcode).await?;
    Ok(Json(product))
}

/// Clear the scan history
pub async fn clear_history(State(state): State<AppState>) -> AppResult<Json<ClearHistoryResponse>> {
    let deleted = state.history_service().clear().await?;
    Ok(Json(ClearHistoryResponse { deleted }))
}
