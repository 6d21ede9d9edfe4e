use super::super::instrument::RiskLevel;
use serde::{Deserialize, Serialize};

/// Ordered classification table mapping score ranges to risk buckets.
///
/// Entries are `(lower_bound_inclusive, bucket)` pairs; the applicable bucket
/// is the last entry whose lower bound is at or below the score. Validation
/// happens at construction so a misconfigured table can never classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(u8, RiskLevel)>", into = "Vec<(u8, RiskLevel)>")]
pub struct ThresholdTable {
    entries: Vec<(u8, RiskLevel)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold table has no entries")]
    Empty,
    #[error("first lower bound must be 0 so the table covers the full scale, got {0}")]
    UncoveredLowEnd(u8),
    #[error("lower bound {0} exceeds the 0-100 scale")]
    OutOfRange(u8),
    #[error("lower bounds must be strictly increasing ({prev} is followed by {next})")]
    NotIncreasing { prev: u8, next: u8 },
    #[error("bucket order is not monotonic: {next} at bound {bound} is worse than {prev}")]
    NotMonotonic {
        prev: &'static str,
        next: &'static str,
        bound: u8,
    },
}

impl ThresholdTable {
    pub fn new(entries: Vec<(u8, RiskLevel)>) -> Result<Self, ThresholdError> {
        let first = entries.first().ok_or(ThresholdError::Empty)?;
        if first.0 != 0 {
            return Err(ThresholdError::UncoveredLowEnd(first.0));
        }

        for window in entries.windows(2) {
            let (prev_bound, prev_bucket) = window[0];
            let (next_bound, next_bucket) = window[1];
            if next_bound > 100 {
                return Err(ThresholdError::OutOfRange(next_bound));
            }
            if next_bound <= prev_bound {
                return Err(ThresholdError::NotIncreasing {
                    prev: prev_bound,
                    next: next_bound,
                });
            }
            // Higher score must map to an equal-or-better bucket.
            if next_bucket.severity() > prev_bucket.severity() {
                return Err(ThresholdError::NotMonotonic {
                    prev: prev_bucket.label(),
                    next: next_bucket.label(),
                    bound: next_bound,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Default cut points for the integrity instrument.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                (0, RiskLevel::Critical),
                (40, RiskLevel::High),
                (60, RiskLevel::Moderate),
                (80, RiskLevel::Low),
            ],
        }
    }

    pub fn classify(&self, score: f64) -> RiskLevel {
        let clamped = score.clamp(0.0, 100.0);
        let mut bucket = self.entries[0].1;
        for (bound, level) in &self.entries {
            if f64::from(*bound) <= clamped {
                bucket = *level;
            }
        }
        bucket
    }

    pub fn entries(&self) -> &[(u8, RiskLevel)] {
        &self.entries
    }
}

impl TryFrom<Vec<(u8, RiskLevel)>> for ThresholdTable {
    type Error = ThresholdError;

    fn try_from(entries: Vec<(u8, RiskLevel)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ThresholdTable> for Vec<(u8, RiskLevel)> {
    fn from(table: ThresholdTable) -> Self {
        table.entries
    }
}
