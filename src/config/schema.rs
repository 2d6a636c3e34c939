use serde::{Deserialize, Serialize};

use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    /// Default entity data file, used when `--entities` is not given
    #[serde(default)]
    pub entities: Option<String>,
    /// State file for the canonical weighting (defaults to ~/.config/impact-rank/state.json)
    #[serde(default)]
    pub state: Option<String>,
}
