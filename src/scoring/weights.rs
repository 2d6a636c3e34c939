use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::Category;
use super::error::WeightError;

/// Tolerance for every floating-point equality in the engine.
pub const EPSILON: f64 = 1e-9;

/// Starting weights before any vote has been folded in.
pub const DEFAULT_WEIGHTS: [f64; Category::COUNT] = [0.30, 0.20, 0.20, 0.20, 0.10];

/// Normalized, non-negative category weights summing to 1.0.
///
/// Values are immutable once constructed; every update yields a new vector.
/// Serialized as a `category -> weight` map and re-validated on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Category, f64>",
    into = "BTreeMap<Category, f64>"
)]
pub struct WeightVector {
    weights: [f64; Category::COUNT],
}

impl WeightVector {
    /// Validate an array indexed in `Category::ALL` order.
    pub fn new(weights: [f64; Category::COUNT]) -> Result<Self, WeightError> {
        for category in Category::ALL {
            let value = weights[category.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::InvalidComponent { category, value });
            }
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > EPSILON {
            return Err(WeightError::NotNormalized { sum });
        }
        Ok(Self { weights })
    }

    /// Rescale non-negative components with a positive sum so they sum to 1.0.
    ///
    /// Callers uphold the precondition; a violation is a bug in the engine.
    pub(crate) fn renormalized(raw: [f64; Category::COUNT]) -> Self {
        let total: f64 = raw.iter().sum();
        debug_assert!(
            total > 0.0 && raw.iter().all(|w| *w >= 0.0),
            "renormalize requires non-negative weights with a positive sum"
        );
        let mut weights = [0.0; Category::COUNT];
        for (slot, value) in weights.iter_mut().zip(raw) {
            *slot = value / total;
        }
        let vector = Self { weights };
        debug_assert!(vector.is_normalized(), "weights drifted: {}", vector.sum());
        vector
    }

    pub fn get(&self, category: Category) -> f64 {
        self.weights[category.index()]
    }

    /// Weights in `Category::ALL` order.
    pub fn as_array(&self) -> [f64; Category::COUNT] {
        self.weights
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= EPSILON
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &WeightVector, tolerance: f64) -> bool {
        self.weights
            .iter()
            .zip(other.weights.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl TryFrom<BTreeMap<Category, f64>> for WeightVector {
    type Error = WeightError;

    /// Categories absent from the map get weight 0.
    fn try_from(map: BTreeMap<Category, f64>) -> Result<Self, Self::Error> {
        let mut weights = [0.0; Category::COUNT];
        for (category, value) in map {
            weights[category.index()] = value;
        }
        Self::new(weights)
    }
}

impl From<WeightVector> for BTreeMap<Category, f64> {
    fn from(vector: WeightVector) -> Self {
        vector.iter().collect()
    }
}
