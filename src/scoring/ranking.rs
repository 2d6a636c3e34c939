use super::engine::compute_overall;
use super::error::IncompleteScoreError;
use super::weights::{WeightVector, EPSILON};
use crate::entities::Entity;

/// An entity's position in one ranking pass. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub id: String,
    pub score: f64,
    pub rank: usize, // 1-based, strictly ordinal
}

/// An entity left out of a ranking pass and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntity {
    pub id: String,
    pub error: IncompleteScoreError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankingOutcome {
    pub ranked: Vec<RankedEntity>,
    pub skipped: Vec<SkippedEntity>,
}

/// Order entities by overall score and assign strict ordinal ranks.
///
/// Highest score gets rank 1. A tie run starts at the highest remaining score
/// and takes every score within `EPSILON` of it; tied entities are ordered by
/// id ascending. Ties never share a rank: every entity gets a distinct
/// consecutive position.
pub fn rank(entities: Vec<(String, f64)>) -> Vec<RankedEntity> {
    let mut entries = entities;

    // Exact order first so the tie pass below works on contiguous runs
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut start = 0;
    while start < entries.len() {
        let mut end = start + 1;
        while end < entries.len() && entries[start].1 - entries[end].1 <= EPSILON {
            end += 1;
        }
        if end - start > 1 {
            entries[start..end].sort_by(|a, b| a.0.cmp(&b.0));
        }
        start = end;
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (id, score))| RankedEntity {
            id,
            score,
            rank: i + 1,
        })
        .collect()
}

/// Score every entity under `weights` and rank the ones that could be scored.
///
/// Incomplete score sets are isolated: the entity lands in `skipped` and the
/// rest of the batch is still ranked.
pub fn rank_entities(entities: &[Entity], weights: &WeightVector) -> RankingOutcome {
    let mut scored = Vec::with_capacity(entities.len());
    let mut skipped = Vec::new();

    for entity in entities {
        match compute_overall(&entity.scores, weights) {
            Ok(score) => scored.push((entity.id.clone(), score)),
            Err(error) => {
                tracing::warn!(entity = %entity.id, %error, "skipping entity with incomplete scores");
                skipped.push(SkippedEntity {
                    id: entity.id.clone(),
                    error,
                });
            }
        }
    }

    RankingOutcome {
        ranked: rank(scored),
        skipped,
    }
}
