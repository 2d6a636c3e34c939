pub mod aggregate;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod ranking;
pub mod validation;
pub mod weights;

pub use aggregate::{fold, AggregationPolicy, AggregatorState, SmoothingFactor, VoteAggregator};
pub use category::Category;
pub use config::ScoringConfig;
pub use engine::{calculate_score, compute_overall, EntityScoreSet, ScoreBreakdown, ScoreResult};
pub use error::{IncompleteScoreError, InvalidVoteError, WeightError};
pub use normalize::{normalize, RawVoteSubmission};
pub use ranking::{rank, rank_entities, RankedEntity, RankingOutcome, SkippedEntity};
pub use validation::validate_scoring;
pub use weights::{WeightVector, EPSILON};
