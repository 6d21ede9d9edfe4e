use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::instrument::QuestionBank;
use super::report::ScoredAssessment;
use super::repository::{
    AlertError, AssessmentAlert, AssessmentId, AssessmentRecord, AssessmentRepository,
    AssessmentStatus, NotificationPublisher, RepositoryError,
};
use super::scoring::{
    IntegrityMismatch, ResponseInput, ScoreReport, ScoringConfig, ScoringEngine, ScoringError,
};

/// Service composing the question bank, scoring engine, repository, and
/// notification hook into the assessment lifecycle.
pub struct AssessmentService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    engine: Arc<ScoringEngine>,
    bank: Arc<QuestionBank>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

impl<R, N> AssessmentService<R, N>
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<N>,
        config: ScoringConfig,
        bank: Arc<QuestionBank>,
    ) -> Self {
        Self {
            repository,
            notifications,
            engine: Arc::new(ScoringEngine::new(config)),
            bank,
        }
    }

    pub fn question_bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Open a new in-progress run for a subject.
    pub fn start(
        &self,
        subject_id: String,
        department: String,
        started_on: NaiveDate,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = AssessmentRecord {
            id: next_assessment_id(),
            subject_id,
            department,
            status: AssessmentStatus::InProgress,
            started_on,
            completed_on: None,
            responses: Vec::new(),
            score: None,
        };

        let stored = self.repository.insert(record)?;
        info!(assessment_id = %stored.id.0, subject = %stored.subject_id, "assessment started");
        Ok(stored)
    }

    /// Record one answer. Re-answering a question replaces the earlier
    /// response; completed assessments reject writes outright.
    pub fn save_response(
        &self,
        id: &AssessmentId,
        response: ResponseInput,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status == AssessmentStatus::Completed {
            return Err(AssessmentServiceError::ResponsesFrozen(id.clone()));
        }

        record
            .responses
            .retain(|existing| existing.question_id != response.question_id);
        record.responses.push(response);

        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Freeze the response set, score it, and persist the result. An
    /// assessment with nothing scorable stays in progress and unscored.
    pub fn complete(
        &self,
        id: &AssessmentId,
        completed_on: NaiveDate,
    ) -> Result<ScoreReport, AssessmentServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status == AssessmentStatus::Completed {
            return Err(AssessmentServiceError::AlreadyCompleted(id.clone()));
        }

        let report = match self.engine.score(&record.responses, &self.bank) {
            Ok(report) => report,
            Err(ScoringError::InsufficientData { excluded }) => {
                warn!(assessment_id = %id.0, excluded = excluded.len(), "assessment not scorable");
                return Err(AssessmentServiceError::NotScorable { excluded });
            }
        };

        if !report.excluded.is_empty() {
            warn!(
                assessment_id = %id.0,
                excluded = report.excluded.len(),
                "responses excluded from scoring due to integrity mismatches"
            );
        }

        record.status = AssessmentStatus::Completed;
        record.completed_on = Some(completed_on);
        record.score = Some(report.clone());
        self.repository.update(record)?;

        info!(
            assessment_id = %id.0,
            overall_score = report.overall_score,
            risk_level = report.risk_level.label(),
            "assessment completed and scored"
        );

        self.publish_completion(id, &report)?;

        Ok(report)
    }

    /// Explicit correction path: replace the response set and rerun scoring.
    /// Responses, not scores, are the source of truth, so this is the only
    /// way a completed assessment's score changes.
    pub fn rescore(
        &self,
        id: &AssessmentId,
        responses: Vec<ResponseInput>,
    ) -> Result<ScoreReport, AssessmentServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status != AssessmentStatus::Completed {
            return Err(AssessmentServiceError::NotCompleted(id.clone()));
        }

        warn!(
            assessment_id = %id.0,
            replaced_responses = record.responses.len(),
            new_responses = responses.len(),
            "rescoring assessment from corrected responses"
        );

        let report = match self.engine.score(&responses, &self.bank) {
            Ok(report) => report,
            Err(ScoringError::InsufficientData { excluded }) => {
                return Err(AssessmentServiceError::NotScorable { excluded });
            }
        };

        record.responses = responses;
        record.score = Some(report.clone());
        self.repository.update(record)?;

        Ok(report)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// All completed, scored assessments flattened for the roll-up reports.
    pub fn scored_assessments(&self) -> Result<Vec<ScoredAssessment>, AssessmentServiceError> {
        let records = self.repository.completed()?;
        Ok(records
            .iter()
            .filter_map(AssessmentRecord::scored_row)
            .collect())
    }

    fn publish_completion(
        &self,
        id: &AssessmentId,
        report: &ScoreReport,
    ) -> Result<(), AssessmentServiceError> {
        let mut details = BTreeMap::new();
        details.insert(
            "overall_score".to_string(),
            format!("{}", report.overall_score.round() as i64),
        );
        details.insert(
            "risk_level".to_string(),
            report.risk_level.label().to_string(),
        );
        self.notifications.publish(AssessmentAlert {
            template: "assessment_completed".to_string(),
            assessment_id: id.clone(),
            details: details.clone(),
        })?;

        // Managers get a direct alert for high and critical outcomes.
        if matches!(
            report.risk_level,
            super::instrument::RiskLevel::High | super::instrument::RiskLevel::Critical
        ) {
            self.notifications.publish(AssessmentAlert {
                template: "risk_alert".to_string(),
                assessment_id: id.clone(),
                details,
            })?;
        }

        Ok(())
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("assessment {} is completed; responses are frozen", .0 .0)]
    ResponsesFrozen(AssessmentId),
    #[error("assessment {} is already completed", .0 .0)]
    AlreadyCompleted(AssessmentId),
    #[error("assessment {} is not completed; nothing to rescore", .0 .0)]
    NotCompleted(AssessmentId),
    #[error("assessment has no scorable responses ({} excluded)", excluded.len())]
    NotScorable { excluded: Vec<IntegrityMismatch> },
}
