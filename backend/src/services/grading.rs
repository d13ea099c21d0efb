//! Product grading service
//!
//! Resolves the effective criteria and runs the shared grading engine.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::criteria::CriteriaService;
use shared::{grade_product, AgeGroup, GradingCriteria, NutritionRecord, ProductGrade};

/// Grading service for nutrition records
#[derive(Clone)]
pub struct GradingService {
    criteria: CriteriaService,
}

impl GradingService {
    /// Create a new GradingService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            criteria: CriteriaService::new(db),
        }
    }

    /// Grade a product for an age group
    ///
    /// `criteria` overrides the persisted and built-in criteria for this
    /// call only.
    pub async fn grade(
        &self,
        nutrition: &NutritionRecord,
        age_group: &str,
        criteria: Option<GradingCriteria>,
    ) -> AppResult<ProductGrade> {
        let (criteria, source) = self.criteria.resolve(criteria).await;

        let known = age_group
            .parse::<AgeGroup>()
            .ok()
            .filter(|group| criteria.age_group(*group).is_some());
        if known.is_none() {
            tracing::warn!(
                age_group,
                fallback = %AgeGroup::DEFAULT,
                "Age group has no criteria, using fallback thresholds"
            );
        }

        let grade = grade_product(nutrition, age_group, &criteria).map_err(|e| {
            tracing::error!(barcode = %nutrition.barcode, "Error grading product: {}", e);
            e
        })?;

        tracing::info!(
            barcode = %nutrition.barcode,
            age_group,
            criteria_source = ?source,
            grade = %grade.grade,
            score = %grade.score,
            highlights = grade.highlights.len(),
            "Graded product"
        );

        Ok(grade)
    }

    /// Criteria store behind this service
    pub fn criteria(&self) -> &CriteriaService {
        &self.criteria
    }
}
