//! Workforce integrity assessments: the question bank, per-assessment
//! scoring engine, lifecycle service, and organizational roll-up reports.

pub mod import;
pub mod instrument;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use instrument::{
    parse_option_list, AnswerOption, Dimension, InstrumentError, MoralLevel, Question,
    QuestionBank, QuestionId, QuestionKind, RiskLevel,
};
pub use repository::{
    AlertError, AssessmentAlert, AssessmentId, AssessmentRecord, AssessmentRepository,
    AssessmentStatus, AssessmentStatusView, NotificationPublisher, RepositoryError,
};
pub use router::assessment_router;
pub use scoring::{
    Answer, IntegrityMismatch, Interpretation, MismatchReason, MoralTieBreak, ResponseInput,
    ScoreBand, ScoreReport, ScoringConfig, ScoringEngine, ScoringError, ThresholdError,
    ThresholdTable,
};
pub use service::{AssessmentService, AssessmentServiceError};
