use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::entities::EntityFormat;
use crate::scoring::{AggregatorState, InvalidVoteError, RawVoteSubmission, VoteAggregator};

/// On-disk batch of raw vote submissions.
///
/// Example YAML:
/// ```yaml
/// votes:
///   - { social: 60, cultural: 40 }
///   - { environmental: 1, political: 1 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteFile {
    #[serde(default)]
    pub votes: Vec<BTreeMap<String, f64>>,
}

/// Outcome of a batch submission.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub accepted: usize,
    /// Rejected votes by their 0-based position in the batch, in batch order
    pub rejected: Vec<(usize, InvalidVoteError)>,
    pub state: Arc<AggregatorState>,
}

/// Read a vote batch from a YAML or JSON file (`.json` extension selects JSON).
pub fn load_votes(path: &Path) -> Result<Vec<BTreeMap<String, f64>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read vote file at {}", path.display()))?;

    let file: VoteFile = match EntityFormat::from_path(path) {
        EntityFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse votes: invalid JSON in {}", path.display()))?,
        EntityFormat::Yaml => serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse votes: invalid YAML in {}", path.display()))?,
    };

    Ok(file.votes)
}

/// Submit a batch of raw votes concurrently against one aggregator.
///
/// Each vote is validated and folded on the blocking pool; the aggregator
/// serializes the folds, so every accepted vote is reflected in the final
/// state. A rejected vote does not stop the rest of the batch.
pub async fn ingest_votes(
    aggregator: Arc<VoteAggregator>,
    votes: Vec<BTreeMap<String, f64>>,
) -> Result<IngestReport> {
    let mut futures = FuturesUnordered::new();
    for (index, vote) in votes.into_iter().enumerate() {
        let aggregator = Arc::clone(&aggregator);
        futures.push(async move {
            let result = tokio::task::spawn_blocking(move || {
                let raw = RawVoteSubmission::from_pairs(vote)?;
                aggregator.submit(&raw)
            })
            .await;
            (index, result)
        });
    }

    let mut accepted = 0;
    let mut rejected = Vec::new();

    while let Some((index, result)) = futures.next().await {
        match result.context("Vote submission task failed")? {
            Ok(_) => accepted += 1,
            Err(e) => {
                tracing::warn!(vote = index + 1, error = %e, "rejected vote");
                rejected.push((index, e));
            }
        }
    }

    rejected.sort_by_key(|(index, _)| *index);

    Ok(IngestReport {
        accepted,
        rejected,
        state: aggregator.snapshot(),
    })
}
