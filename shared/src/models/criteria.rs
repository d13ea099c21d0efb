//! Grading criteria models
//!
//! Thresholds are per serving. The built-in bundle returned by
//! [`GradingCriteria::default`] is used whenever no persisted criteria exist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HighlightCategory;

/// Infant/toddler developmental bracket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    #[serde(rename = "0-6months")]
    ZeroToSixMonths,
    #[serde(rename = "6-12months")]
    SixToTwelveMonths,
    #[serde(rename = "12-24months")]
    TwelveToTwentyFourMonths,
    #[serde(rename = "2-5years")]
    TwoToFiveYears,
}

impl AgeGroup {
    /// Bracket used when the requested one is not recognized
    pub const DEFAULT: AgeGroup = AgeGroup::SixToTwelveMonths;

    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::ZeroToSixMonths,
        AgeGroup::SixToTwelveMonths,
        AgeGroup::TwelveToTwentyFourMonths,
        AgeGroup::TwoToFiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::ZeroToSixMonths => "0-6months",
            AgeGroup::SixToTwelveMonths => "6-12months",
            AgeGroup::TwelveToTwentyFourMonths => "12-24months",
            AgeGroup::TwoToFiveYears => "2-5years",
        }
    }

    /// Human readable label for pickers
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::ZeroToSixMonths => "0-6 months",
            AgeGroup::SixToTwelveMonths => "6-12 months",
            AgeGroup::TwelveToTwentyFourMonths => "12-24 months",
            AgeGroup::TwoToFiveYears => "2-5 years",
        }
    }

    /// All selectable age groups in display order
    pub fn options() -> Vec<AgeGroupOption> {
        AgeGroup::ALL
            .into_iter()
            .map(|group| AgeGroupOption {
                value: group,
                label: group.label(),
            })
            .collect()
    }
}

/// Picker entry for an age group
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AgeGroupOption {
    pub value: AgeGroup,
    pub label: &'static str,
}

impl Default for AgeGroup {
    fn default() -> Self {
        AgeGroup::DEFAULT
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeGroup {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or("Unknown age group")
    }
}

/// Product category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Purees,
    Snacks,
    Drinks,
    Cereals,
    Meals,
}

/// Nutrition thresholds for one age group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeGroupCriteria {
    pub age_group: AgeGroup,
    /// mg
    pub max_sodium: Decimal,
    /// g
    pub max_sugar: Decimal,
    /// g
    pub max_fat: Decimal,
    /// g
    pub min_protein: Decimal,
    /// g
    pub min_fiber: Decimal,
    pub max_calories: Decimal,
}

impl AgeGroupCriteria {
    fn new(age_group: AgeGroup, limits: [i64; 6]) -> Self {
        let [sodium, sugar, fat, protein, fiber, calories] = limits.map(Decimal::from);
        Self {
            age_group,
            max_sodium: sodium,
            max_sugar: sugar,
            max_fat: fat,
            min_protein: protein,
            min_fiber: fiber,
            max_calories: calories,
        }
    }

    /// Hardcoded thresholds used when a criteria bundle lacks even the
    /// default age group.
    pub fn fallback() -> Self {
        Self::new(AgeGroup::DEFAULT, [140, 6, 3, 2, 1, 120])
    }

    pub(crate) fn thresholds(&self) -> [(&'static str, Decimal); 6] {
        [
            ("max_sodium", self.max_sodium),
            ("max_sugar", self.max_sugar),
            ("max_fat", self.max_fat),
            ("min_protein", self.min_protein),
            ("min_fiber", self.min_fiber),
            ("max_calories", self.max_calories),
        ]
    }
}

/// Nutrition thresholds for one product category
///
/// Part of the persisted configuration; the scoring algorithm does not
/// consult it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCriteria {
    pub category: ProductCategory,
    pub max_sodium: Decimal,
    pub max_sugar: Decimal,
    pub max_fat: Decimal,
    pub min_protein: Decimal,
    pub min_fiber: Decimal,
    pub max_calories: Decimal,
    pub bonus_points: Decimal,
    pub penalty_points: Decimal,
}

impl CategoryCriteria {
    fn new(category: ProductCategory, limits: [i64; 6], bonus: i64, penalty: i64) -> Self {
        let [sodium, sugar, fat, protein, fiber, calories] = limits.map(Decimal::from);
        Self {
            category,
            max_sodium: sodium,
            max_sugar: sugar,
            max_fat: fat,
            min_protein: protein,
            min_fiber: fiber,
            max_calories: calories,
            bonus_points: Decimal::from(bonus),
            penalty_points: Decimal::from(penalty),
        }
    }
}

/// Full grading configuration bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingCriteria {
    pub age_groups: Vec<AgeGroupCriteria>,
    #[serde(default)]
    pub categories: Vec<CategoryCriteria>,
    #[serde(default)]
    pub artificial_ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl GradingCriteria {
    /// Thresholds registered for `age_group`, if any
    pub fn age_group(&self, age_group: AgeGroup) -> Option<&AgeGroupCriteria> {
        self.age_groups.iter().find(|c| c.age_group == age_group)
    }
}

impl Default for GradingCriteria {
    fn default() -> Self {
        Self {
            age_groups: vec![
                AgeGroupCriteria::new(AgeGroup::ZeroToSixMonths, [140, 0, 3, 1, 0, 100]),
                AgeGroupCriteria::new(AgeGroup::SixToTwelveMonths, [140, 6, 3, 2, 1, 120]),
                AgeGroupCriteria::new(AgeGroup::TwelveToTwentyFourMonths, [200, 8, 4, 3, 2, 150]),
                AgeGroupCriteria::new(AgeGroup::TwoToFiveYears, [300, 12, 5, 4, 3, 200]),
            ],
            categories: vec![
                CategoryCriteria::new(ProductCategory::Purees, [140, 6, 3, 2, 1, 120], 5, 10),
                CategoryCriteria::new(ProductCategory::Snacks, [200, 8, 4, 3, 2, 150], 0, 15),
            ],
            artificial_ingredients: DEFAULT_ARTIFICIAL_INGREDIENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allergens: DEFAULT_ALLERGENS.iter().map(|s| s.to_string()).collect(),
            last_updated: Utc::now(),
        }
    }
}

/// Built-in artificial ingredient keywords
pub const DEFAULT_ARTIFICIAL_INGREDIENTS: &[&str] = &[
    "artificial colors",
    "artificial flavors",
    "artificial sweeteners",
    "aspartame",
    "saccharin",
    "sucralose",
    "acesulfame potassium",
    "high fructose corn syrup",
    "partially hydrogenated",
    "trans fat",
];

/// Built-in allergen keywords
pub const DEFAULT_ALLERGENS: &[&str] = &[
    "milk",
    "eggs",
    "fish",
    "shellfish",
    "tree nuts",
    "peanuts",
    "wheat",
    "soy",
];

/// Penalty points per highlight category
///
/// `protein` and `fiber` are carried for completeness; deficiency highlights
/// are reported under [`HighlightCategory::Nutrition`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradingWeights {
    pub sugar: u32,
    pub sodium: u32,
    pub fat: u32,
    pub artificial: u32,
    pub allergens: u32,
    pub nutrition: u32,
    pub protein: u32,
    pub fiber: u32,
}

impl GradingWeights {
    pub const STANDARD: GradingWeights = GradingWeights {
        sugar: 25,
        sodium: 20,
        fat: 15,
        artificial: 20,
        allergens: 10,
        nutrition: 5,
        protein: 3,
        fiber: 2,
    };

    pub fn weight_for(&self, category: HighlightCategory) -> u32 {
        match category {
            HighlightCategory::Sugar => self.sugar,
            HighlightCategory::Sodium => self.sodium,
            HighlightCategory::Fat => self.fat,
            HighlightCategory::Artificial => self.artificial,
            HighlightCategory::Allergens => self.allergens,
            HighlightCategory::Nutrition => self.nutrition,
        }
    }
}

impl Default for GradingWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}
