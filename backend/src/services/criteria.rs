//! Grading criteria store
//!
//! Criteria are resolved per call from three layers: a caller-supplied
//! bundle, the persisted bundle, then the built-in defaults.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{validate_criteria, GradingCriteria};

/// Where the effective criteria came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaSource {
    Request,
    Persisted,
    Defaults,
}

/// Grading criteria service
#[derive(Clone)]
pub struct CriteriaService {
    db: PgPool,
}

impl CriteriaService {
    /// Create a new CriteriaService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Effective criteria for one grading call
    pub async fn resolve(
        &self,
        requested: Option<GradingCriteria>,
    ) -> (GradingCriteria, CriteriaSource) {
        let persisted = match requested {
            Some(_) => None,
            None => self.load_persisted().await,
        };
        layer(requested, persisted)
    }

    /// Persist criteria, replacing any stored bundle
    pub async fn save(&self, mut criteria: GradingCriteria) -> AppResult<GradingCriteria> {
        validate_criteria(&criteria).map_err(|e| match e {
            shared::GradingError::InvalidCriteria { field, message } => {
                AppError::Validation { field, message }
            }
        })?;

        if criteria.age_groups.is_empty() {
            return Err(AppError::validation(
                "age_groups",
                "At least one age group is required",
            ));
        }

        criteria.last_updated = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO grading_criteria (id, criteria, updated_at)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO UPDATE
            SET criteria = EXCLUDED.criteria, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Json(&criteria))
        .bind(criteria.last_updated)
        .execute(&self.db)
        .await?;

        tracing::info!(
            age_groups = criteria.age_groups.len(),
            "Saved grading criteria"
        );

        Ok(criteria)
    }

    /// Drop the persisted bundle so defaults apply again
    pub async fn reset(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM grading_criteria WHERE id = 1")
            .execute(&self.db)
            .await?;

        tracing::info!("Reset grading criteria to defaults");
        Ok(())
    }

    /// Persisted bundle; storage or decode failures fall through to defaults
    async fn load_persisted(&self) -> Option<GradingCriteria> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT criteria FROM grading_criteria WHERE id = 1",
        )
        .fetch_optional(&self.db)
        .await;

        match row {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(criteria) => Some(criteria),
                Err(e) => {
                    tracing::warn!("Stored grading criteria are unreadable: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Error retrieving grading criteria: {}", e);
                None
            }
        }
    }
}

/// First present layer wins
fn layer(
    requested: Option<GradingCriteria>,
    persisted: Option<GradingCriteria>,
) -> (GradingCriteria, CriteriaSource) {
    match (requested, persisted) {
        (Some(criteria), _) => (criteria, CriteriaSource::Request),
        (None, Some(criteria)) => (criteria, CriteriaSource::Persisted),
        (None, None) => (GradingCriteria::default(), CriteriaSource::Defaults),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_allergens(allergens: &[&str]) -> GradingCriteria {
        GradingCriteria {
            allergens: allergens.iter().map(|s| s.to_string()).collect(),
            ..GradingCriteria::default()
        }
    }

    #[test]
    fn request_layer_wins() {
        let (criteria, source) = layer(Some(with_allergens(&["sesame"])), Some(with_allergens(&["milk"])));
        assert_eq!(source, CriteriaSource::Request);
        assert_eq!(criteria.allergens, vec!["sesame"]);
    }

    #[test]
    fn persisted_layer_beats_defaults() {
        let (criteria, source) = layer(None, Some(with_allergens(&["milk"])));
        assert_eq!(source, CriteriaSource::Persisted);
        assert_eq!(criteria.allergens, vec!["milk"]);
    }

    #[test]
    fn defaults_when_nothing_supplied() {
        let (criteria, source) = layer(None, None);
        assert_eq!(source, CriteriaSource::Defaults);
        assert_eq!(criteria.age_groups.len(), 4);
        assert_eq!(criteria.allergens.len(), 8);
        assert_eq!(criteria.artificial_ingredients.len(), 10);
    }
}
