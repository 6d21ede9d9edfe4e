mod config;
mod interpretation;
mod rules;
mod thresholds;

pub use config::{MoralTieBreak, ScoringConfig};
pub use interpretation::Interpretation;
pub use thresholds::{ThresholdError, ThresholdTable};

use super::instrument::{Dimension, MoralLevel, QuestionBank, QuestionId, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One answer from one participant to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseInput {
    pub question_id: QuestionId,
    pub answer: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<u32>,
}

/// Stored answer token: a forced-choice option value or a Likert scale value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Choice(String),
    Scale(u8),
}

impl Answer {
    pub(crate) fn stored_value(&self) -> String {
        match self {
            Answer::Choice(value) => value.clone(),
            Answer::Scale(value) => value.to_string(),
        }
    }
}

/// A response whose stored answer no longer matches the question definition.
/// Excluded from scoring and surfaced to the caller, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityMismatch {
    pub question_id: QuestionId,
    pub answer: String,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    UnknownQuestion,
    UnmatchedOption,
    ScaleOutOfRange,
}

/// Per-dimension band used in narrative reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            ScoreBand::High
        } else if score >= 40.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

/// Deterministic flag raised by response patterns worth a reviewer's eye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicator {
    pub kind: RiskIndicatorKind,
    pub severity: IndicatorSeverity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskIndicatorKind {
    TimeAnomaly,
    LowDimension,
    OverallRisk,
    MoralLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Full scoring output for one assessment. Dimension scores are kept at full
/// precision; rounding happens only when a view is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub dimension_scores: BTreeMap<Dimension, f64>,
    pub dimension_bands: BTreeMap<Dimension, ScoreBand>,
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral_level: Option<MoralLevel>,
    pub dominant_dimension: Dimension,
    pub weakest_dimension: Dimension,
    pub risk_indicators: Vec<RiskIndicator>,
    pub interpretation: Interpretation,
    pub excluded: Vec<IntegrityMismatch>,
    pub scored_responses: usize,
    /// Mean seconds per submitted response; unreported times count as zero.
    pub avg_time_per_question_secs: u32,
}

impl ScoreReport {
    /// Display-rounded shape for API responses and exports.
    pub fn view(&self) -> ScoreReportView {
        ScoreReportView {
            dimension_scores: self
                .dimension_scores
                .iter()
                .map(|(dimension, score)| DimensionScoreView {
                    code: dimension.code(),
                    name: dimension.name(),
                    score: round_display(*score),
                    band: self
                        .dimension_bands
                        .get(dimension)
                        .copied()
                        .unwrap_or_else(|| ScoreBand::from_score(*score)),
                })
                .collect(),
            overall_score: round_display(self.overall_score),
            risk_level: self.risk_level,
            moral_level: self.moral_level,
            dominant_dimension: self.dominant_dimension.code(),
            weakest_dimension: self.weakest_dimension.code(),
            risk_indicators: self.risk_indicators.clone(),
            interpretation: self.interpretation.clone(),
            excluded: self.excluded.clone(),
            scored_responses: self.scored_responses,
            avg_time_per_question_secs: self.avg_time_per_question_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReportView {
    pub dimension_scores: Vec<DimensionScoreView>,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moral_level: Option<MoralLevel>,
    pub dominant_dimension: &'static str,
    pub weakest_dimension: &'static str,
    pub risk_indicators: Vec<RiskIndicator>,
    pub interpretation: Interpretation,
    pub excluded: Vec<IntegrityMismatch>,
    pub scored_responses: usize,
    pub avg_time_per_question_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionScoreView {
    pub code: &'static str,
    pub name: &'static str,
    pub score: u8,
    pub band: ScoreBand,
}

pub(crate) fn round_display(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    /// Nothing resolved to a known option: the assessment stays unscored
    /// because a zero score must remain distinguishable from "no data".
    #[error("assessment has no scorable responses ({} excluded)", excluded.len())]
    InsufficientData { excluded: Vec<IntegrityMismatch> },
}

const FAST_RESPONSE_SHARE: f64 = 0.3;
const LOW_DIMENSION_CUTOFF: f64 = 30.0;
const CRITICAL_OVERALL_CUTOFF: f64 = 40.0;

/// Stateless scorer applying one instrument's configuration.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        responses: &[ResponseInput],
        bank: &QuestionBank,
    ) -> Result<ScoreReport, ScoringError> {
        let resolved = rules::resolve(responses, bank);

        if resolved.per_dimension.is_empty() {
            return Err(ScoringError::InsufficientData {
                excluded: resolved.excluded,
            });
        }

        let mut dimension_scores = BTreeMap::new();
        let mut dimension_bands = BTreeMap::new();
        for (dimension, scores) in &resolved.per_dimension {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            dimension_scores.insert(*dimension, mean);
            dimension_bands.insert(*dimension, ScoreBand::from_score(mean));
        }

        // Dimensions weigh equally in the overall score regardless of how
        // many questions fed each of them.
        let overall_score =
            dimension_scores.values().sum::<f64>() / dimension_scores.len() as f64;
        let risk_level = self.config.thresholds.classify(overall_score);
        let moral_level = plurality_moral_level(&resolved.moral_counts, self.config.moral_tie_break);

        let (dominant_dimension, weakest_dimension) = extremes(&dimension_scores);

        let risk_indicators = detect_risk_indicators(
            &dimension_scores,
            overall_score,
            moral_level,
            resolved.fast,
            responses.len(),
        );

        let interpretation = interpretation::interpret(
            &dimension_bands,
            overall_score,
            dominant_dimension,
            moral_level,
        );

        Ok(ScoreReport {
            dimension_scores,
            dimension_bands,
            overall_score,
            risk_level,
            moral_level,
            dominant_dimension,
            weakest_dimension,
            risk_indicators,
            interpretation,
            excluded: resolved.excluded,
            scored_responses: resolved.scored,
            avg_time_per_question_secs: average_time_secs(responses),
        })
    }
}

fn average_time_secs(responses: &[ResponseInput]) -> u32 {
    if responses.is_empty() {
        return 0;
    }
    let total: u64 = responses
        .iter()
        .map(|response| u64::from(response.time_spent_secs.unwrap_or(0)))
        .sum();
    (total as f64 / responses.len() as f64).round() as u32
}

fn plurality_moral_level(
    counts: &BTreeMap<MoralLevel, usize>,
    tie_break: MoralTieBreak,
) -> Option<MoralLevel> {
    let best = counts.values().copied().max()?;
    counts
        .iter()
        .filter(|(_, count)| **count == best)
        .map(|(level, _)| *level)
        .max_by_key(|level| match tie_break {
            MoralTieBreak::PreferHigherStage => level.stage(),
            MoralTieBreak::PreferLowerStage => u8::MAX - level.stage(),
        })
}

fn extremes(scores: &BTreeMap<Dimension, f64>) -> (Dimension, Dimension) {
    let mut iter = scores.iter();
    // Callers guarantee at least one entry; the first seeds both extremes.
    let (&first, &first_score) = iter
        .next()
        .unwrap_or((&Dimension::Honesty, &0.0));
    let mut dominant = (first, first_score);
    let mut weakest = (first, first_score);
    for (&dimension, &score) in iter {
        if score > dominant.1 {
            dominant = (dimension, score);
        }
        if score < weakest.1 {
            weakest = (dimension, score);
        }
    }
    (dominant.0, weakest.0)
}

fn detect_risk_indicators(
    dimension_scores: &BTreeMap<Dimension, f64>,
    overall_score: f64,
    moral_level: Option<MoralLevel>,
    fast_responses: usize,
    total_responses: usize,
) -> Vec<RiskIndicator> {
    let mut indicators = Vec::new();

    if total_responses > 0
        && fast_responses as f64 > total_responses as f64 * FAST_RESPONSE_SHARE
    {
        indicators.push(RiskIndicator {
            kind: RiskIndicatorKind::TimeAnomaly,
            severity: IndicatorSeverity::Medium,
            description: format!(
                "{fast_responses} of {total_responses} responses were answered in under {} seconds",
                rules::FAST_RESPONSE_SECS
            ),
        });
    }

    for (dimension, score) in dimension_scores {
        if *score < LOW_DIMENSION_CUTOFF {
            indicators.push(RiskIndicator {
                kind: RiskIndicatorKind::LowDimension,
                severity: IndicatorSeverity::High,
                description: format!(
                    "critical score in {} ({}/100)",
                    dimension.name(),
                    round_display(*score)
                ),
            });
        }
    }

    if overall_score < CRITICAL_OVERALL_CUTOFF {
        indicators.push(RiskIndicator {
            kind: RiskIndicatorKind::OverallRisk,
            severity: IndicatorSeverity::Critical,
            description: format!(
                "overall integrity score below acceptable level ({}/100)",
                round_display(overall_score)
            ),
        });
    }

    if moral_level == Some(MoralLevel::PreConventional) {
        indicators.push(RiskIndicator {
            kind: RiskIndicatorKind::MoralLevel,
            severity: IndicatorSeverity::High,
            description: "response pattern indicates a pre-conventional moral level".to_string(),
        });
    }

    indicators
}
