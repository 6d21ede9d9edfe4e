use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::assessments::instrument::{QuestionBank, QuestionKind};
use crate::assessments::repository::{
    AlertError, AssessmentAlert, AssessmentId, AssessmentRecord, AssessmentRepository,
    NotificationPublisher, RepositoryError,
};
use crate::assessments::scoring::{Answer, ResponseInput, ScoringConfig};
use crate::assessments::service::AssessmentService;
use crate::assessments::AssessmentStatus;

#[derive(Default, Clone)]
pub(crate) struct InMemoryRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn completed(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == AssessmentStatus::Completed)
            .cloned()
            .collect())
    }
}

/// Repository that fails every call, for exercising the 500 path.
pub(crate) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".into()))
    }

    fn update(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".into()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".into()))
    }

    fn completed(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".into()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingPublisher {
    events: Arc<Mutex<Vec<AssessmentAlert>>>,
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, alert: AssessmentAlert) -> Result<(), AlertError> {
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl RecordingPublisher {
    pub(crate) fn events(&self) -> Vec<AssessmentAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

pub(crate) type TestService = AssessmentService<InMemoryRepository, RecordingPublisher>;

pub(crate) fn service_with_standard_bank() -> (Arc<TestService>, RecordingPublisher) {
    let repository = Arc::new(InMemoryRepository::default());
    let publisher = RecordingPublisher::default();
    let service = Arc::new(AssessmentService::new(
        repository,
        Arc::new(publisher.clone()),
        ScoringConfig::standard_integrity(),
        Arc::new(QuestionBank::standard_integrity()),
    ));
    (service, publisher)
}

pub(crate) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json body")
}

pub(crate) fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 12).expect("valid date")
}

/// Answer every question in the bank: forced-choice questions with the given
/// option value, Likert questions with the given scale value.
pub(crate) fn uniform_responses(
    bank: &QuestionBank,
    choice: &str,
    scale: u8,
) -> Vec<ResponseInput> {
    bank.questions()
        .map(|question| ResponseInput {
            question_id: question.id,
            answer: match question.kind {
                QuestionKind::ForcedChoice => Answer::Choice(choice.to_string()),
                QuestionKind::LikertScale => Answer::Scale(scale),
            },
            justification: None,
            time_spent_secs: Some(12),
        })
        .collect()
}
