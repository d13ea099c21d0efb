//! Nutrition lookup service
//!
//! Serves product nutrition data from the local cache while it is fresh and
//! falls back to the external food database otherwise.

use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::config::CacheConfig;
use crate::error::{AppError, AppResult};
use crate::external::FatSecretClient;
use shared::NutritionRecord;

/// Nutrition lookup service with a barcode-keyed cache
#[derive(Clone)]
pub struct NutritionService {
    db: PgPool,
    client: FatSecretClient,
    cache: CacheConfig,
}

/// Database row for a cached lookup
#[derive(Debug, FromRow)]
struct CacheRow {
    record: Json<NutritionRecord>,
    cached_at: DateTime<Utc>,
}

impl NutritionService {
    /// Create a new NutritionService instance
    pub fn new(db: PgPool, client: FatSecretClient, cache: CacheConfig) -> Self {
        Self { db, client, cache }
    }

    /// Get nutrition data for a barcode, cached or freshly fetched
    pub async fn lookup(&self, barcode: &str) -> AppResult<NutritionRecord> {
        match self.cached(barcode).await {
            Ok(Some(record)) => {
                tracing::debug!(barcode, "Nutrition cache hit");
                return Ok(record);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(barcode, "Error reading nutrition cache: {}", e),
        }

        let record = self
            .client
            .find_by_barcode(barcode)
            .await
            .map_err(|e| AppError::NutritionLookup {
                barcode: barcode.to_string(),
                source: Box::new(e),
            })?;

        if self.cache.enabled {
            // A failed cache write does not fail the lookup
            if let Err(e) = self.store(barcode, &record).await {
                tracing::warn!(barcode, "Error caching nutrition data: {}", e);
            }
        }

        Ok(record)
    }

    /// Search products by name
    pub async fn search(&self, query: &str, max_results: u32) -> AppResult<Vec<NutritionRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("q", "Search query is required"));
        }

        self.client.search_by_name(query, max_results).await
    }

    /// Check if the external food database is reachable
    pub async fn is_api_available(&self) -> bool {
        self.client.is_available().await
    }

    /// Fresh cached record for a barcode, if any
    async fn cached(&self, barcode: &str) -> AppResult<Option<NutritionRecord>> {
        let row = sqlx::query_as::<_, CacheRow>(
            "SELECT record, cached_at FROM nutrition_cache WHERE barcode = $1",
        )
        .bind(barcode)
        .fetch_optional(&self.db)
        .await?;

        let now = Utc::now();
        Ok(row
            .filter(|r| is_fresh(r.cached_at, now, self.cache.expiry_hours))
            .map(|r| r.record.0))
    }

    /// Write a record back to the cache and drop expired entries
    async fn store(&self, barcode: &str, record: &NutritionRecord) -> AppResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO nutrition_cache (barcode, record, cached_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (barcode) DO UPDATE
            SET record = EXCLUDED.record, cached_at = EXCLUDED.cached_at
            "#,
        )
        .bind(barcode)
        .bind(Json(record))
        .bind(now)
        .execute(&self.db)
        .await?;

        let Some(cutoff) = expiry_cutoff(now, self.cache.expiry_hours) else {
            return Ok(());
        };

        let purged = sqlx::query("DELETE FROM nutrition_cache WHERE cached_at < $1")
            .bind(cutoff)
            .execute(&self.db)
            .await?
            .rows_affected();

        if purged > 0 {
            tracing::debug!(purged, "Purged expired nutrition cache entries");
        }

        Ok(())
    }
}

/// Oldest cache timestamp still considered fresh at `now`, or `None` when
/// the window reaches past the earliest representable time
fn expiry_cutoff(now: DateTime<Utc>, expiry_hours: i64) -> Option<DateTime<Utc>> {
    Duration::try_hours(expiry_hours).and_then(|window| now.checked_sub_signed(window))
}

/// Check if an entry cached at `cached_at` is still fresh at `now`
fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>, expiry_hours: i64) -> bool {
    match expiry_cutoff(now, expiry_hours) {
        Some(cutoff) => cached_at > cutoff,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_window() {
        let now = Utc::now();

        assert!(is_fresh(now - Duration::hours(23), now, 24));
        assert!(is_fresh(now, now, 24));
        assert!(!is_fresh(now - Duration::hours(24), now, 24));
        assert!(!is_fresh(now - Duration::days(3), now, 48));
    }

    #[test]
    fn oversized_window_keeps_everything_fresh() {
        let now = Utc::now();

        assert!(expiry_cutoff(now, i64::MAX).is_none());
        assert!(is_fresh(now - Duration::days(3650), now, i64::MAX));
    }

    #[test]
    fn zero_window_disables_hits() {
        let now = Utc::now();
        assert!(!is_fresh(now, now, 0));
    }
}
