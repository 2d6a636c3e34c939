use std::collections::BTreeMap;

use super::category::Category;
use super::error::InvalidVoteError;
use super::weights::WeightVector;

/// A voter's unnormalized category weights.
///
/// Categories that are not set count as zero. No sum invariant is enforced
/// until the submission goes through [`normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVoteSubmission {
    values: BTreeMap<Category, f64>,
}

impl RawVoteSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and programmatic callers.
    pub fn with(mut self, category: Category, value: f64) -> Self {
        self.values.insert(category, value);
        self
    }

    pub fn get(&self, category: Category) -> f64 {
        self.values.get(&category).copied().unwrap_or(0.0)
    }

    /// Map free-form `key -> value` pairs onto the fixed category set.
    ///
    /// Unknown keys and repeated categories are rejected rather than dropped
    /// so a misspelled client field cannot silently zero a category.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, InvalidVoteError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            let category: Category = key.as_ref().parse()?;
            if values.insert(category, value).is_some() {
                return Err(InvalidVoteError::DuplicateCategory(category));
            }
        }
        Ok(Self { values })
    }

    /// Parse command-line entries of the form `social=60`.
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Self, InvalidVoteError> {
        let mut pairs = Vec::with_capacity(args.len());
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| InvalidVoteError::Malformed(arg.to_string()))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| InvalidVoteError::Malformed(arg.to_string()))?;
            pairs.push((key.to_string(), value));
        }
        Self::from_pairs(pairs)
    }
}

/// Turn a raw submission into a weight vector summing to 1.0.
pub fn normalize(raw: &RawVoteSubmission) -> Result<WeightVector, InvalidVoteError> {
    let mut values = [0.0; Category::COUNT];
    for category in Category::ALL {
        let value = raw.get(category);
        if !value.is_finite() {
            return Err(InvalidVoteError::NonFinite { category });
        }
        if value < 0.0 {
            return Err(InvalidVoteError::Negative { category, value });
        }
        values[category.index()] = value;
    }

    // Scale by the largest component first so the sum cannot overflow
    let largest = values.iter().copied().fold(0.0, f64::max);
    if largest == 0.0 {
        return Err(InvalidVoteError::ZeroTotal);
    }
    for value in values.iter_mut() {
        *value /= largest;
    }

    Ok(WeightVector::renormalized(values))
}
