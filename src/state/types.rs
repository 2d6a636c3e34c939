use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{AggregationPolicy, AggregatorState, WeightVector};

pub const STATE_VERSION: u32 = 1;

/// Durable form of the canonical weighting.
///
/// Holds the weights plus whatever the aggregation policy needs to resume:
/// the policy itself (with alpha for EMA) and the running vote count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub policy: AggregationPolicy,
    #[serde(default)]
    pub votes_folded: u64,
    pub weights: WeightVector,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&AggregatorState> for PersistedState {
    fn from(state: &AggregatorState) -> Self {
        Self {
            version: STATE_VERSION,
            policy: state.policy,
            votes_folded: state.votes_folded,
            weights: state.weights,
            updated_at: state.updated_at,
        }
    }
}

impl PersistedState {
    /// Turn the stored state back into aggregator state under the
    /// configured policy.
    ///
    /// Switching between a running average and an EMA would reinterpret the
    /// stored count, so a kind mismatch is refused. A changed EMA alpha is
    /// taken from the configuration.
    pub fn resume(self, configured: AggregationPolicy) -> Result<AggregatorState> {
        if !self.policy.same_kind(&configured) {
            anyhow::bail!(
                "Stored weights were aggregated with the {} policy but the config requests {}. \
                 Run `impact-rank reset` to start over under the new policy.",
                self.policy.name(),
                configured.name()
            );
        }
        if self.policy != configured {
            tracing::info!(from = %self.policy, to = %configured, "aggregation parameters changed");
        }

        Ok(AggregatorState {
            weights: self.weights,
            policy: configured,
            votes_folded: self.votes_folded,
            updated_at: self.updated_at,
        })
    }
}
