//! HTTP handlers for grading criteria endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::AppState;
use shared::GradingCriteria;

/// Get the criteria currently used for grading
pub async fn get_criteria(State(state): State<AppState>) -> Json<GradingCriteria> {
    let (criteria, _) = state.grading_service().criteria().resolve(None).await;
    Json(criteria)
}

/// Replace the stored criteria
pub async fn update_criteria(
    State(state): State<AppState>,
    Json(criteria): Json<GradingCriteria>,
) -> AppResult<Json<GradingCriteria>> {
    let saved = state.grading_service().criteria().save(criteria).await?;
    Ok(Json(saved))
}

/// Remove the stored criteria so the built-in defaults apply
pub async fn reset_criteria(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.grading_service().criteria().reset().await?;
    Ok(StatusCode::NO_CONTENT)
}
