use std::collections::BTreeMap;

use super::category::Category;
use super::error::IncompleteScoreError;
use super::weights::WeightVector;

/// Externally sourced per-category scores for one entity.
///
/// Values are opaque rubric numbers; the engine never rescales them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityScoreSet {
    scores: BTreeMap<Category, f64>,
}

impl EntityScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, score: f64) -> Self {
        self.scores.insert(category, score);
        self
    }

    pub fn insert(&mut self, category: Category, score: f64) {
        self.scores.insert(category, score);
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.scores.get(&category).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Categories in canonical order that have no score.
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.scores.contains_key(c))
            .collect()
    }
}

impl FromIterator<(Category, f64)> for EntityScoreSet {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryContribution {
    pub category: Category,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64, // score * weight
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub contributions: Vec<CategoryContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Weighted sum of an entity's category scores.
///
/// Every category in the weight vector is required, including ones weighted
/// zero, so a gap in the source data is reported instead of scoring as 0.
pub fn compute_overall(
    scores: &EntityScoreSet,
    weights: &WeightVector,
) -> Result<f64, IncompleteScoreError> {
    let values = require_all(scores)?;
    Ok(dot(&values, &weights.as_array()))
}

/// Overall score plus the per-category contributions that produced it.
pub fn calculate_score(
    scores: &EntityScoreSet,
    weights: &WeightVector,
) -> Result<ScoreResult, IncompleteScoreError> {
    let values = require_all(scores)?;
    let contributions = Category::ALL
        .into_iter()
        .map(|category| {
            let score = values[category.index()];
            let weight = weights.get(category);
            CategoryContribution {
                category,
                score,
                weight,
                contribution: score * weight,
            }
        })
        .collect();

    Ok(ScoreResult {
        score: dot(&values, &weights.as_array()),
        breakdown: ScoreBreakdown { contributions },
    })
}

fn require_all(scores: &EntityScoreSet) -> Result<[f64; Category::COUNT], IncompleteScoreError> {
    let missing = scores.missing();
    if !missing.is_empty() {
        return Err(IncompleteScoreError { missing });
    }
    let mut values = [0.0; Category::COUNT];
    for category in Category::ALL {
        values[category.index()] = scores.get(category).unwrap_or_default();
    }
    Ok(values)
}

fn dot(values: &[f64; Category::COUNT], weights: &[f64; Category::COUNT]) -> f64 {
    values.iter().zip(weights.iter()).map(|(s, w)| s * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::weights::EPSILON;

    fn sample_scores() -> EntityScoreSet {
        EntityScoreSet::new()
            .with(Category::Social, 20.0)
            .with(Category::Environmental, 15.0)
            .with(Category::Political, 10.0)
            .with(Category::Philanthropy, 18.0)
            .with(Category::Cultural, 5.0)
    }

    #[test]
    fn test_default_weights_worked_example() {
        // 20*.30 + 15*.20 + 10*.20 + 18*.20 + 5*.10 = 6 + 3 + 2 + 3.6 + 0.5
        let overall = compute_overall(&sample_scores(), &WeightVector::default()).unwrap();
        assert!((overall - 15.1).abs() < EPSILON);
    }

    #[test]
    fn test_single_category_weight() {
        let weights = WeightVector::new([0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let overall = compute_overall(&sample_scores(), &weights).unwrap();
        assert_eq!(overall, 18.0);
    }

    #[test]
    fn test_missing_category_fails() {
        let scores = EntityScoreSet::new()
            .with(Category::Social, 20.0)
            .with(Category::Environmental, 15.0)
            .with(Category::Philanthropy, 18.0);
        let err = compute_overall(&scores, &WeightVector::default()).unwrap_err();
        assert_eq!(err.missing, vec![Category::Political, Category::Cultural]);
    }

    #[test]
    fn test_zero_weight_category_still_required() {
        let weights = WeightVector::new([0.5, 0.5, 0.0, 0.0, 0.0]).unwrap();
        let scores = EntityScoreSet::new()
            .with(Category::Social, 1.0)
            .with(Category::Environmental, 1.0);
        assert!(compute_overall(&scores, &weights).is_err());
    }

    #[test]
    fn test_negative_scores_pass_through() {
        let scores: EntityScoreSet = Category::ALL.into_iter().map(|c| (c, -10.0)).collect();
        let overall = compute_overall(&scores, &WeightVector::default()).unwrap();
        assert!((overall + 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_linear_in_weights() {
        let scores = sample_scores();
        let values = require_all(&scores).unwrap();
        let weights = WeightVector::default();
        let base = compute_overall(&scores, &weights).unwrap();

        for k in [0.0, 0.5, 2.0, 3.75, 100.0] {
            let scaled = weights.as_array().map(|w| w * k);
            let overall = dot(&values, &scaled);
            assert!(
                (overall - k * base).abs() < 1e-9 * k.max(1.0),
                "k={} gave {} expected {}",
                k,
                overall,
                k * base
            );
        }
    }

    #[test]
    fn test_additive_in_weights() {
        let values = require_all(&sample_scores()).unwrap();
        let a = [0.1, 0.2, 0.0, 0.3, 0.4];
        let b = [0.5, 0.0, 0.25, 0.0, 0.25];
        let sum: [f64; 5] = std::array::from_fn(|i| a[i] + b[i]);
        assert!((dot(&values, &sum) - (dot(&values, &a) + dot(&values, &b))).abs() < EPSILON);
    }

    #[test]
    fn test_breakdown_matches_total() {
        let result = calculate_score(&sample_scores(), &WeightVector::default()).unwrap();
        assert_eq!(result.breakdown.contributions.len(), Category::COUNT);

        let social = &result.breakdown.contributions[0];
        assert_eq!(social.category, Category::Social);
        assert_eq!(social.score, 20.0);
        assert!((social.contribution - 6.0).abs() < EPSILON);

        let total: f64 = result
            .breakdown
            .contributions
            .iter()
            .map(|c| c.contribution)
            .sum();
        assert!((total - result.score).abs() < EPSILON);
        assert!((result.score - 15.1).abs() < EPSILON);
    }

    #[test]
    fn test_deterministic() {
        let scores = sample_scores();
        let weights = WeightVector::new([0.13, 0.27, 0.11, 0.29, 0.2]).unwrap();
        let first = compute_overall(&scores, &weights).unwrap();
        for _ in 0..10 {
            assert_eq!(compute_overall(&scores, &weights).unwrap(), first);
        }
    }
}
