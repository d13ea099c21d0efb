//! Product grade models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of flagged concern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HighlightCategory {
    Sugar,
    Sodium,
    Fat,
    Artificial,
    Allergens,
    /// Low protein, low fiber and excess calories
    Nutrition,
}

/// How far a value exceeds (or falls below) its threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Score penalty multiplier
    pub fn multiplier(&self) -> Decimal {
        match self {
            Severity::Low => Decimal::ONE,
            Severity::Medium => Decimal::new(15, 1),
            Severity::High => Decimal::TWO,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// One flagged nutritional or ingredient concern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeHighlight {
    pub category: HighlightCategory,
    pub severity: Severity,
    pub message: String,
    pub impact: String,
}

/// Letter banding of the numeric score, ordered best first (`A < F`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LetterGrade::A => write!(f, "A"),
            LetterGrade::B => write!(f, "B"),
            LetterGrade::C => write!(f, "C"),
            LetterGrade::D => write!(f, "D"),
            LetterGrade::F => write!(f, "F"),
        }
    }
}

/// Graded, explainable assessment of a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductGrade {
    pub grade: LetterGrade,
    /// 0-100 inclusive
    pub score: Decimal,
    /// In detection order
    pub highlights: Vec<GradeHighlight>,
    pub recommendations: Vec<String>,
    pub graded_at: DateTime<Utc>,
}
