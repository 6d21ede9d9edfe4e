use super::thresholds::ThresholdTable;
use serde::{Deserialize, Serialize};

/// Scoring configuration supplied per instrument type so the same engine can
/// serve the six-dimension integrity instrument and future variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub thresholds: ThresholdTable,
    pub moral_tie_break: MoralTieBreak,
}

impl ScoringConfig {
    pub fn standard_integrity() -> Self {
        Self {
            thresholds: ThresholdTable::standard(),
            moral_tie_break: MoralTieBreak::PreferHigherStage,
        }
    }
}

/// Named policy for resolving ties in the moral-level plurality count.
///
/// The instrument currently resolves ties toward the higher Kohlberg stage
/// (post-conventional over conventional over pre-conventional).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoralTieBreak {
    PreferHigherStage,
    PreferLowerStage,
}
