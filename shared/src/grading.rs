//! Age-group grading engine
//!
//! Turns a [`NutritionRecord`] into an explainable [`ProductGrade`]:
//! 1. Resolve the age group thresholds (falling back to `6-12months`)
//! 2. Detect highlights in a fixed order
//! 3. Subtract weighted penalties from 100 and clamp to 0-100
//! 4. Band the score into a letter grade
//! 5. Attach recommendations
//!
//! Everything here is pure and deterministic apart from the grading
//! timestamp, which [`grade_product_at`] lets the caller supply.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    AgeGroup, AgeGroupCriteria, GradeHighlight, GradingCriteria, GradingWeights,
    HighlightCategory, LetterGrade, NutritionRecord, ProductGrade, Severity,
};

/// Grading failure. No partial grade is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GradingError {
    #[error("Failed to grade product: invalid criteria for {field}: {message}")]
    InvalidCriteria { field: String, message: String },
}

/// Grade a product for an age group, stamped with the current time
pub fn grade_product(
    nutrition: &NutritionRecord,
    age_group: &str,
    criteria: &GradingCriteria,
) -> Result<ProductGrade, GradingError> {
    grade_product_at(nutrition, age_group, criteria, Utc::now())
}

/// Grade a product for an age group with an explicit grading timestamp
pub fn grade_product_at(
    nutrition: &NutritionRecord,
    age_group: &str,
    criteria: &GradingCriteria,
    graded_at: DateTime<Utc>,
) -> Result<ProductGrade, GradingError> {
    validate_criteria(criteria)?;

    let highlights = analyze_nutrition(nutrition, age_group, criteria);
    let score = calculate_score(&highlights, &GradingWeights::STANDARD);
    let grade = grade_for_score(score);
    let recommendations = generate_recommendations(&highlights, grade);

    Ok(ProductGrade {
        grade,
        score,
        highlights,
        recommendations,
        graded_at,
    })
}

/// Reject bundles the engine cannot interpret
pub fn validate_criteria(criteria: &GradingCriteria) -> Result<(), GradingError> {
    for entry in &criteria.age_groups {
        for (name, value) in entry.thresholds() {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(GradingError::InvalidCriteria {
                    field: format!("{}.{}", entry.age_group, name),
                    message: format!("threshold cannot be negative ({})", value),
                });
            }
        }
    }

    let keyword_lists = [
        ("artificial_ingredients", &criteria.artificial_ingredients),
        ("allergens", &criteria.allergens),
    ];
    for (field, keywords) in keyword_lists {
        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(GradingError::InvalidCriteria {
                field: field.to_string(),
                message: "keywords cannot be blank".to_string(),
            });
        }
    }

    Ok(())
}

/// Thresholds for `age_group`: exact match, else the default group, else
/// the hardcoded fallback.
pub fn resolve_age_criteria(criteria: &GradingCriteria, age_group: &str) -> AgeGroupCriteria {
    age_group
        .parse::<AgeGroup>()
        .ok()
        .and_then(|group| criteria.age_group(group))
        .or_else(|| criteria.age_group(AgeGroup::DEFAULT))
        .cloned()
        .unwrap_or_else(AgeGroupCriteria::fallback)
}

/// Detect highlights in fixed order: sugar, sodium, fat, artificial
/// ingredients, allergens, protein, fiber, calories.
pub fn analyze_nutrition(
    nutrition: &NutritionRecord,
    age_group: &str,
    criteria: &GradingCriteria,
) -> Vec<GradeHighlight> {
    let limits = resolve_age_criteria(criteria, age_group);
    let facts = &nutrition.nutrition_facts;
    let mut highlights = Vec::new();

    if facts.total_sugars > limits.max_sugar {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Sugar,
            severity: severity(facts.total_sugars, limits.max_sugar),
            message: format!(
                "High sugar content: {}g per serving",
                facts.total_sugars.normalize()
            ),
            impact: format!(
                "Exceeds recommended limit of {}g for {}",
                limits.max_sugar.normalize(),
                age_group
            ),
        });
    }

    if facts.sodium > limits.max_sodium {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Sodium,
            severity: severity(facts.sodium, limits.max_sodium),
            message: format!(
                "High sodium content: {}mg per serving",
                facts.sodium.normalize()
            ),
            impact: format!(
                "Exceeds recommended limit of {}mg for {}",
                limits.max_sodium.normalize(),
                age_group
            ),
        });
    }

    if facts.total_fat > limits.max_fat {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Fat,
            severity: severity(facts.total_fat, limits.max_fat),
            message: format!(
                "High fat content: {}g per serving",
                facts.total_fat.normalize()
            ),
            impact: format!(
                "Exceeds recommended limit of {}g for {}",
                limits.max_fat.normalize(),
                age_group
            ),
        });
    }

    let artificial = detect_keywords(&nutrition.ingredients, &criteria.artificial_ingredients);
    if !artificial.is_empty() {
        let severity = match artificial.len() {
            n if n > 3 => Severity::High,
            n if n > 1 => Severity::Medium,
            _ => Severity::Low,
        };
        highlights.push(GradeHighlight {
            category: HighlightCategory::Artificial,
            severity,
            message: format!(
                "Contains artificial ingredients: {}",
                artificial.join(", ")
            ),
            impact: "Artificial ingredients may not be suitable for young children".to_string(),
        });
    }

    let allergens = detect_keywords(&nutrition.allergens, &criteria.allergens);
    if !allergens.is_empty() {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Allergens,
            severity: Severity::High,
            message: format!("Contains allergens: {}", allergens.join(", ")),
            impact: "May cause allergic reactions in sensitive children".to_string(),
        });
    }

    // Deficiencies: the ratio is minimum / actual
    if facts.protein < limits.min_protein {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Nutrition,
            severity: severity(limits.min_protein, facts.protein),
            message: format!(
                "Low protein content: {}g per serving",
                facts.protein.normalize()
            ),
            impact: format!(
                "Below recommended minimum of {}g for {}",
                limits.min_protein.normalize(),
                age_group
            ),
        });
    }

    if facts.dietary_fiber < limits.min_fiber {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Nutrition,
            severity: severity(limits.min_fiber, facts.dietary_fiber),
            message: format!(
                "Low fiber content: {}g per serving",
                facts.dietary_fiber.normalize()
            ),
            impact: format!(
                "Below recommended minimum of {}g for {}",
                limits.min_fiber.normalize(),
                age_group
            ),
        });
    }

    if facts.calories > limits.max_calories {
        highlights.push(GradeHighlight {
            category: HighlightCategory::Nutrition,
            severity: severity(facts.calories, limits.max_calories),
            message: format!(
                "High calorie content: {} calories per serving",
                facts.calories.normalize()
            ),
            impact: format!(
                "Exceeds recommended limit of {} calories for {}",
                limits.max_calories.normalize(),
                age_group
            ),
        });
    }

    highlights
}

/// Severity of `value` against `limit`: high at 2x, medium at 1.5x.
///
/// A zero limit makes the ratio unbounded, so any positive value is high.
pub fn severity(value: Decimal, limit: Decimal) -> Severity {
    let Some(ratio) = value.checked_div(limit) else {
        return if value > Decimal::ZERO {
            Severity::High
        } else {
            Severity::Low
        };
    };

    if ratio >= Decimal::TWO {
        Severity::High
    } else if ratio >= Decimal::new(15, 1) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Keywords found (case-insensitive substring) in any of `items`,
/// deduplicated in first-match order.
pub fn detect_keywords(items: &[String], keywords: &[String]) -> Vec<String> {
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut detected = Vec::new();

    for item in items {
        let item = item.to_lowercase();
        for (keyword, needle) in keywords.iter().zip(&lowered) {
            if item.contains(needle.as_str()) && seen.insert(keyword.as_str()) {
                detected.push(keyword.clone());
            }
        }
    }

    detected
}

/// 100 minus the weighted penalty of every highlight, clamped to 0-100
pub fn calculate_score(highlights: &[GradeHighlight], weights: &GradingWeights) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    let penalty: Decimal = highlights
        .iter()
        .map(|h| Decimal::from(weights.weight_for(h.category)) * h.severity.multiplier())
        .sum();

    (hundred - penalty).clamp(Decimal::ZERO, hundred)
}

/// Band a score: 90 A, 80 B, 70 C, 60 D, else F (lower bounds inclusive)
pub fn grade_for_score(score: Decimal) -> LetterGrade {
    match score {
        s if s >= Decimal::from(90) => LetterGrade::A,
        s if s >= Decimal::from(80) => LetterGrade::B,
        s if s >= Decimal::from(70) => LetterGrade::C,
        s if s >= Decimal::from(60) => LetterGrade::D,
        _ => LetterGrade::F,
    }
}

/// Two grade-level recommendations, then one per sugar, sodium, artificial
/// or allergen highlight in detection order.
pub fn generate_recommendations(highlights: &[GradeHighlight], grade: LetterGrade) -> Vec<String> {
    let general: [&str; 2] = match grade {
        LetterGrade::A => [
            "Excellent choice for your baby!",
            "This product meets all nutritional guidelines.",
        ],
        LetterGrade::B => [
            "Good choice with minor concerns.",
            "Consider as an occasional treat rather than daily food.",
        ],
        LetterGrade::C => [
            "Moderate nutritional value.",
            "Consider healthier alternatives for regular consumption.",
        ],
        LetterGrade::D => [
            "Not recommended for regular consumption.",
            "Look for products with lower sugar and sodium content.",
        ],
        LetterGrade::F => [
            "Not suitable for babies.",
            "Choose products specifically designed for infant nutrition.",
        ],
    };

    let specific = highlights.iter().filter_map(|h| match h.category {
        HighlightCategory::Sugar => Some("Look for products with no added sugars."),
        HighlightCategory::Sodium => Some("Choose low-sodium alternatives."),
        HighlightCategory::Artificial => Some("Prefer products with natural ingredients only."),
        HighlightCategory::Allergens => Some("Consult with pediatrician before introducing."),
        HighlightCategory::Fat | HighlightCategory::Nutrition => None,
    });

    general
        .into_iter()
        .chain(specific)
        .map(str::to_string)
        .collect()
}
