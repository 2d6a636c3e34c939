//! Error types for the scoring engine.

use thiserror::Error;

use super::category::Category;

/// A vote submission that cannot be turned into a weight vector.
///
/// Rejected votes are never folded into the canonical weighting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidVoteError {
    /// A category was given a negative weight.
    #[error("weight for {category} must be non-negative, got {value}")]
    Negative { category: Category, value: f64 },

    /// A category was given NaN or an infinite weight.
    #[error("weight for {category} must be a finite number")]
    NonFinite { category: Category },

    /// Every weight was zero, so there is nothing to normalize.
    #[error("vote weights sum to zero")]
    ZeroTotal,

    /// The submission named a category outside the fixed set.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// The same category appeared twice in one submission.
    #[error("category {0} given more than once")]
    DuplicateCategory(Category),

    /// A command-line entry was not of the form CATEGORY=WEIGHT.
    #[error("malformed vote entry '{0}', expected CATEGORY=WEIGHT")]
    Malformed(String),
}

/// An entity's score set lacks a category the weight vector requires.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("missing scores for {}", join_categories(.missing))]
pub struct IncompleteScoreError {
    pub missing: Vec<Category>,
}

/// A mapping that does not satisfy the weight vector invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("weight for {category} must be a non-negative finite number, got {value}")]
    InvalidComponent { category: Category, value: f64 },

    #[error("weights must sum to 1.0, got {sum}")]
    NotNormalized { sum: f64 },
}

/// EMA smoothing factor outside (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("smoothing factor must be in (0, 1], got {0}")]
pub struct InvalidSmoothingFactor(pub f64);

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
