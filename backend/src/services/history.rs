//! Scan history service
//!
//! One entry per barcode. Rescanning replaces the entry in place; new
//! barcodes go to the front and the oldest entries past the cap are dropped.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use shared::{NutritionRecord, ProductGrade, ScannedProduct};

/// Scan history service
#[derive(Clone)]
pub struct HistoryService {
    db: PgPool,
    max_entries: usize,
}

/// Database row for a scanned product
#[derive(Debug, FromRow)]
struct HistoryRow {
    barcode: String,
    nutrition: Json<NutritionRecord>,
    grade: Json<ProductGrade>,
    scan_date: DateTime<Utc>,
    is_favorite: bool,
}

impl From<HistoryRow> for ScannedProduct {
    fn from(row: HistoryRow) -> Self {
        ScannedProduct {
            barcode: row.barcode,
            nutrition: row.nutrition.0,
            grade: row.grade.0,
            scan_date: row.scan_date,
            is_favorite: row.is_favorite,
        }
    }
}

/// Outcome of saving a scanned product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub replaced: bool,
    pub evicted: u64,
}

/// Upsert by barcode. `created_at` is only set on insert, so a replaced
/// entry keeps its place in the history.
const UPSERT_SCANNED_PRODUCT: &str = r#"
    INSERT INTO scanned_products (barcode, nutrition, grade, scan_date, is_favorite)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (barcode) DO UPDATE
    SET nutrition = EXCLUDED.nutrition,
        grade = EXCLUDED.grade,
        scan_date = EXCLUDED.scan_date,
        is_favorite = EXCLUDED.is_favorite
"#;

/// Effect of saving one barcode on the stored history
#[derive(Debug, PartialEq, Eq)]
struct SavePlan {
    replaced: bool,
    /// Barcodes to drop, oldest last
    evict: Vec<String>,
}

/// Plan a save of `barcode` against `history` (newest first).
///
/// A known barcode is replaced in place and evicts nothing. A new one takes
/// the front slot and everything past `max_entries` is dropped.
fn plan_save(history: &[String], barcode: &str, max_entries: usize) -> SavePlan {
    if history.iter().any(|b| b == barcode) {
        return SavePlan {
            replaced: true,
            evict: Vec::new(),
        };
    }

    SavePlan {
        replaced: false,
        evict: history
            .iter()
            .skip(max_entries.saturating_sub(1))
            .cloned()
            .collect(),
    }
}

impl HistoryService {
    /// Create a new HistoryService instance
    pub fn new(db: PgPool, max_entries: usize) -> Self {
        Self { db, max_entries }
    }

    /// Save a scanned product, replacing any entry with the same barcode
    pub async fn save(&self, product: &ScannedProduct) -> AppResult<SaveOutcome> {
        let mut tx = self.db.begin().await?;

        let history: Vec<String> = sqlx::query_scalar(
            "SELECT barcode FROM scanned_products ORDER BY created_at DESC FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        let plan = plan_save(&history, &product.barcode, self.max_entries);

        sqlx::query(UPSERT_SCANNED_PRODUCT)
            .bind(&product.barcode)
            .bind(Json(&product.nutrition))
            .bind(Json(&product.grade))
            .bind(product.scan_date)
            .bind(product.is_favorite)
            .execute(&mut *tx)
            .await?;

        let evicted = if plan.evict.is_empty() {
            0
        } else {
            sqlx::query("DELETE FROM scanned_products WHERE barcode = ANY($1)")
                .bind(&plan.evict)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        };

        tx.commit().await?;

        tracing::debug!(
            barcode = %product.barcode,
            replaced = plan.replaced,
            evicted,
            "Saved scanned product"
        );

        Ok(SaveOutcome {
            replaced: plan.replaced,
            evicted,
        })
    }

    /// List all scanned products, newest first
    pub async fn list(&self) -> AppResult<Vec<ScannedProduct>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT barcode, nutrition, grade, scan_date, is_favorite
            FROM scanned_products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// List favorite products, newest first
    pub async fn list_favorites(&self) -> AppResult<Vec<ScannedProduct>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT barcode, nutrition, grade, scan_date, is_favorite
            FROM scanned_products
            WHERE is_favorite
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Get a scanned product by barcode
    pub async fn get(&self, barcode: &str) -> AppResult<ScannedProduct> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT barcode, nutrition, grade, scan_date, is_favorite
            FROM scanned_products
            WHERE barcode = $1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Scanned product".to_string()))?;

        Ok(row.into())
    }

    /// Flip the favorite flag of a scanned product
    pub async fn toggle_favorite(&self, barcode: &str) -> AppResult<ScannedProduct> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            UPDATE scanned_products
            SET is_favorite = NOT is_favorite
            WHERE barcode = $1
            RETURNING barcode, nutrition, grade, scan_date, is_favorite
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Scanned product".to_string()))?;

        tracing::info!(barcode, is_favorite = row.is_favorite, "Toggled favorite");
        Ok(row.into())
    }

    /// Delete the whole history
    pub async fn clear(&self) -> AppResult<u64> {
        let deleted = sqlx::query("DELETE FROM scanned_products")
            .execute(&self.db)
            .await?
            .rows_affected();

        tracing::info!(deleted, "Cleared scan history");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(barcodes: &[&str]) -> Vec<String> {
        barcodes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rescan_replaces_without_eviction() {
        // Full history, rescanning the oldest entry
        let current = history(&["c", "b", "a"]);
        let plan = plan_save(&current, "a", 3);

        assert!(plan.replaced);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn new_barcode_below_cap_evicts_nothing() {
        let plan = plan_save(&history(&["b", "a"]), "c", 3);

        assert!(!plan.replaced);
        assert!(plan.evict.is_empty());
    }

    #[test]
    fn new_barcode_at_cap_drops_the_oldest() {
        let plan = plan_save(&history(&["c", "b", "a"]), "d", 3);

        assert!(!plan.replaced);
        assert_eq!(plan.evict, history(&["a"]));
    }

    #[test]
    fn lowered_cap_trims_everything_past_it() {
        let plan = plan_save(&history(&["e", "d", "c", "b", "a"]), "f", 2);
        assert_eq!(plan.evict, history(&["d", "c", "b", "a"]));
    }

    #[test]
    fn single_slot_history_keeps_only_the_new_entry() {
        let plan = plan_save(&history(&["a"]), "b", 1);
        assert_eq!(plan.evict, history(&["a"]));
    }

    #[test]
    fn empty_history_accepts_first_scan() {
        let plan = plan_save(&[], "a", 1);
        assert_eq!(
            plan,
            SavePlan {
                replaced: false,
                evict: Vec::new(),
            }
        );
    }

    #[test]
    fn upsert_keeps_position_and_takes_new_favorite_flag() {
        let update = UPSERT_SCANNED_PRODUCT
            .split("DO UPDATE")
            .nth(1)
            .unwrap_or_default();

        assert!(!update.contains("created_at"));
        assert!(update.contains("is_favorite = EXCLUDED.is_favorite"));
    }

    #[test]
    fn rescanned_product_is_not_a_favorite() {
        let nutrition = NutritionRecord::summary("Oat Puffs".to_string(), None);
        let grade = shared::grade_product(
            &nutrition,
            "6-12months",
            &shared::GradingCriteria::default(),
        )
        .unwrap();

        let rescan = ScannedProduct::new("96385074".to_string(), nutrition, grade);
        assert!(!rescan.is_favorite);
    }
}
