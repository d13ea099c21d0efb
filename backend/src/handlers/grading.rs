//! HTTP handlers for product grading endpoints

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::AppState;
use shared::{AgeGroup, AgeGroupOption, GradingCriteria, NutritionRecord, ProductGrade};

/// Input for grading a nutrition record directly
#[derive(Debug, Deserialize)]
pub struct GradeProductInput {
    pub nutrition: NutritionRecord,
    pub age_group: Option<String>,
    /// Overrides the stored criteria for this request only
    pub criteria: Option<GradingCriteria>,
}

/// Grade a nutrition record without touching the scan history
pub async fn grade_product(
    State(state): State<AppState>,
    Json(input): Json<GradeProductInput>,
) -> AppResult<Json<ProductGrade>> {
    let age_group = input
        .age_group
        .unwrap_or_else(|| AgeGroup::DEFAULT.to_string());
    let grade = state
        .grading_service()
        .grade(&input.nutrition, &age_group, input.criteria)
        .await?;
    Ok(Json(grade))
}

/// List selectable age groups
pub async fn list_age_groups() -> Json<Vec<AgeGroupOption>> {
    Json(AgeGroup::options())
}
