use super::super::instrument::{Dimension, MoralLevel, QuestionBank, QuestionKind};
use super::{Answer, IntegrityMismatch, MismatchReason, ResponseInput};
use std::collections::BTreeMap;

/// Responses answered faster than this are counted toward the time anomaly
/// indicator.
pub(crate) const FAST_RESPONSE_SECS: u32 = 5;

/// Likert answers are captured on a 1-5 agreement scale.
pub(crate) const LIKERT_MAX: u8 = 5;

pub(crate) struct ResolvedResponses {
    pub per_dimension: BTreeMap<Dimension, Vec<f64>>,
    pub moral_counts: BTreeMap<MoralLevel, usize>,
    pub excluded: Vec<IntegrityMismatch>,
    pub scored: usize,
    pub fast: usize,
}

/// Resolve each response against the question bank, grouping numeric scores
/// by dimension. Unmatched answers become integrity mismatches rather than
/// silent zeros.
pub(crate) fn resolve(responses: &[ResponseInput], bank: &QuestionBank) -> ResolvedResponses {
    let mut per_dimension: BTreeMap<Dimension, Vec<f64>> = BTreeMap::new();
    let mut moral_counts: BTreeMap<MoralLevel, usize> = BTreeMap::new();
    let mut excluded = Vec::new();
    let mut scored = 0usize;
    let mut fast = 0usize;

    for response in responses {
        if response
            .time_spent_secs
            .map(|secs| secs < FAST_RESPONSE_SECS)
            .unwrap_or(false)
        {
            fast += 1;
        }

        let Some(question) = bank.question(response.question_id) else {
            excluded.push(IntegrityMismatch {
                question_id: response.question_id,
                answer: response.answer.stored_value(),
                reason: MismatchReason::UnknownQuestion,
            });
            continue;
        };

        let resolved = match (&response.answer, question.kind) {
            (Answer::Choice(value), _) => match question.option(value) {
                Some(option) => {
                    if let Some(level) = option.moral_level {
                        *moral_counts.entry(level).or_insert(0) += 1;
                    }
                    Some(f64::from(option.score))
                }
                None => {
                    excluded.push(IntegrityMismatch {
                        question_id: response.question_id,
                        answer: value.clone(),
                        reason: MismatchReason::UnmatchedOption,
                    });
                    None
                }
            },
            (Answer::Scale(value), QuestionKind::LikertScale) => {
                if (1..=LIKERT_MAX).contains(value) {
                    Some(f64::from(*value) / f64::from(LIKERT_MAX) * 100.0)
                } else {
                    excluded.push(IntegrityMismatch {
                        question_id: response.question_id,
                        answer: value.to_string(),
                        reason: MismatchReason::ScaleOutOfRange,
                    });
                    None
                }
            }
            (Answer::Scale(value), QuestionKind::ForcedChoice) => {
                excluded.push(IntegrityMismatch {
                    question_id: response.question_id,
                    answer: value.to_string(),
                    reason: MismatchReason::UnmatchedOption,
                });
                None
            }
        };

        if let Some(score) = resolved {
            per_dimension
                .entry(question.dimension)
                .or_default()
                .push(score);
            scored += 1;
        }
    }

    ResolvedResponses {
        per_dimension,
        moral_counts,
        excluded,
        scored,
        fast,
    }
}
