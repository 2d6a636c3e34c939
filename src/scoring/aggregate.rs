use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::category::Category;
use super::error::{InvalidSmoothingFactor, InvalidVoteError};
use super::normalize::{normalize, RawVoteSubmission};
use super::weights::WeightVector;

pub const DEFAULT_ALPHA: f64 = 0.1;

/// EMA smoothing factor, guaranteed to lie in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SmoothingFactor(f64);

impl SmoothingFactor {
    pub fn new(alpha: f64) -> Result<Self, InvalidSmoothingFactor> {
        if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
            Ok(Self(alpha))
        } else {
            Err(InvalidSmoothingFactor(alpha))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SmoothingFactor {
    fn default() -> Self {
        Self(DEFAULT_ALPHA)
    }
}

impl TryFrom<f64> for SmoothingFactor {
    type Error = InvalidSmoothingFactor;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}

impl From<SmoothingFactor> for f64 {
    fn from(alpha: SmoothingFactor) -> Self {
        alpha.0
    }
}

/// How accepted votes combine into the canonical weighting.
///
/// The two policies are not interchangeable: a running average weights every
/// vote equally, an EMA favors recent votes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// `new = (current * n + vote) / (n + 1)` where `n` is the number of
    /// votes folded so far.
    #[default]
    RunningAverage,
    /// `new = (1 - alpha) * current + alpha * vote`.
    Ema { alpha: SmoothingFactor },
}

impl AggregationPolicy {
    pub fn ema(alpha: f64) -> Result<Self, InvalidSmoothingFactor> {
        Ok(AggregationPolicy::Ema {
            alpha: SmoothingFactor::new(alpha)?,
        })
    }

    /// Config/state name of the policy, without parameters.
    pub fn name(&self) -> &'static str {
        match self {
            AggregationPolicy::RunningAverage => "running-average",
            AggregationPolicy::Ema { .. } => "ema",
        }
    }

    /// True when both policies are the same kind, ignoring parameters.
    pub fn same_kind(&self, other: &AggregationPolicy) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationPolicy::RunningAverage => f.write_str("running-average"),
            AggregationPolicy::Ema { alpha } => write!(f, "ema (alpha {})", alpha.get()),
        }
    }
}

/// Everything needed to resume aggregation: the canonical weights plus the
/// policy and its running parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorState {
    pub weights: WeightVector,
    pub policy: AggregationPolicy,
    pub votes_folded: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AggregatorState {
    /// Fresh state: `initial` weights, no votes yet.
    pub fn new(initial: WeightVector, policy: AggregationPolicy) -> Self {
        Self {
            weights: initial,
            policy,
            votes_folded: 0,
            updated_at: None,
        }
    }
}

impl Default for AggregatorState {
    fn default() -> Self {
        Self::new(WeightVector::default(), AggregationPolicy::default())
    }
}

/// Fold one normalized vote into `current` and return the next state.
///
/// The combined vector is re-normalized so drift never accumulates. Pure:
/// `updated_at` is carried over unchanged.
pub fn fold(current: &AggregatorState, vote: &WeightVector) -> AggregatorState {
    let prior = current.weights.as_array();
    let incoming = vote.as_array();
    let mut combined = [0.0; Category::COUNT];

    match current.policy {
        AggregationPolicy::RunningAverage => {
            let n = current.votes_folded as f64;
            for i in 0..Category::COUNT {
                combined[i] = (prior[i] * n + incoming[i]) / (n + 1.0);
            }
        }
        AggregationPolicy::Ema { alpha } => {
            let alpha = alpha.get();
            for i in 0..Category::COUNT {
                combined[i] = (1.0 - alpha) * prior[i] + alpha * incoming[i];
            }
        }
    }

    AggregatorState {
        weights: WeightVector::renormalized(combined),
        policy: current.policy,
        votes_folded: current.votes_folded.saturating_add(1),
        updated_at: current.updated_at,
    }
}

/// Owner of the canonical weighting for one scope.
///
/// Folds are serialized on the writer lock and each result is published as
/// an immutable snapshot. Readers only clone the snapshot `Arc`, so they see
/// either the previous or the next vector in full and never wait on a fold.
#[derive(Debug)]
pub struct VoteAggregator {
    writer: Mutex<AggregatorState>,
    published: RwLock<Arc<AggregatorState>>,
}

impl VoteAggregator {
    pub fn new(state: AggregatorState) -> Self {
        let published = RwLock::new(Arc::new(state.clone()));
        Self {
            writer: Mutex::new(state),
            published,
        }
    }

    /// Current canonical state.
    pub fn snapshot(&self) -> Arc<AggregatorState> {
        Arc::clone(&self.published.read())
    }

    /// Current canonical weights.
    pub fn weights(&self) -> WeightVector {
        self.snapshot().weights
    }

    /// Normalize and fold a raw vote. Invalid votes leave the state untouched.
    pub fn submit(&self, raw: &RawVoteSubmission) -> Result<Arc<AggregatorState>, InvalidVoteError> {
        let vote = normalize(raw)?;
        Ok(self.fold_vote(&vote))
    }

    /// Fold an already-normalized vote.
    pub fn fold_vote(&self, vote: &WeightVector) -> Arc<AggregatorState> {
        let mut state = self.writer.lock();
        let mut next = fold(&state, vote);
        next.updated_at = Some(Utc::now());
        tracing::debug!(
            votes_folded = next.votes_folded,
            policy = next.policy.name(),
            "folded vote into canonical weights"
        );
        self.publish(&mut state, next)
    }

    /// Replace the canonical state with `initial` weights and no votes,
    /// keeping the current policy.
    pub fn reset(&self, initial: WeightVector) -> Arc<AggregatorState> {
        let mut state = self.writer.lock();
        let mut next = AggregatorState::new(initial, state.policy);
        next.updated_at = Some(Utc::now());
        self.publish(&mut state, next)
    }

    fn publish(&self, state: &mut AggregatorState, next: AggregatorState) -> Arc<AggregatorState> {
        *state = next.clone();
        let snapshot = Arc::new(next);
        *self.published.write() = Arc::clone(&snapshot);
        snapshot
    }
}

impl Default for VoteAggregator {
    fn default() -> Self {
        Self::new(AggregatorState::default())
    }
}
