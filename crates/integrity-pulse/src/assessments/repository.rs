use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::ScoredAssessment;
use super::scoring::{round_display, ResponseInput, ScoreReport};

/// Identifier wrapper for assessment instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Lifecycle status; `Completed` is terminal and freezes the response set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
        }
    }
}

/// Repository record holding one subject's assessment run: responses are the
/// source of truth; the score is derived and replaced only by an explicit
/// rescore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub subject_id: String,
    pub department: String,
    pub status: AssessmentStatus,
    pub started_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<NaiveDate>,
    pub responses: Vec<ResponseInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreReport>,
}

impl AssessmentRecord {
    pub fn status_view(&self) -> AssessmentStatusView {
        AssessmentStatusView {
            assessment_id: self.id.clone(),
            subject_id: self.subject_id.clone(),
            department: self.department.clone(),
            status: self.status.label(),
            responses: self.responses.len(),
            overall_score: self
                .score
                .as_ref()
                .map(|report| round_display(report.overall_score)),
            risk_level: self
                .score
                .as_ref()
                .map(|report| report.risk_level.label()),
            moral_level: self
                .score
                .as_ref()
                .and_then(|report| report.moral_level)
                .map(|level| level.label()),
            excluded_responses: self
                .score
                .as_ref()
                .map(|report| report.excluded.len())
                .unwrap_or(0),
        }
    }

    /// Flatten into the aggregation row shape; `None` until scored.
    pub fn scored_row(&self) -> Option<ScoredAssessment> {
        let report = self.score.as_ref()?;
        let completed_on = self.completed_on?;
        Some(ScoredAssessment {
            subject_id: self.subject_id.clone(),
            department: self.department.clone(),
            completed_on,
            overall_score: report.overall_score,
            dimension_scores: report.dimension_scores.clone(),
            risk_level: report.risk_level,
            moral_level: report.moral_level,
        })
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn completed(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (e-mail adapter, manager alert queue).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, alert: AssessmentAlert) -> Result<(), AlertError>;
}

/// Simple alert payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentAlert {
    pub template: String,
    pub assessment_id: AssessmentId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an assessment's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentStatusView {
    pub assessment_id: AssessmentId,
    pub subject_id: String,
    pub department: String,
    pub status: &'static str,
    pub responses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moral_level: Option<&'static str>,
    pub excluded_responses: usize,
}
