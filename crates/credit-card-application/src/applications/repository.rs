use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, CreditCardApplication, CreditCardApplicationDecision,
};
use super::evaluation::EvaluationOutcome;

/// Repository record containing the application, evaluation, and status metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub application: CreditCardApplication,
    pub status: ApplicationStatus,
    pub evaluation: Option<EvaluationOutcome>,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn decision_rationale(&self) -> String {
        match &self.evaluation {
            Some(outcome) => outcome.rationale(),
            None => "pending evaluation".to_string(),
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            status: self.status.label(),
            decision: self
                .evaluation
                .as_ref()
                .map(|outcome| outcome.decision.label()),
            decision_rationale: self.decision_rationale(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn referred(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook handing referred applications to human underwriters.
pub trait ReviewQueue: Send + Sync {
    fn enqueue(&self, referral: ReviewReferral) -> Result<(), ReviewQueueError>;
}

/// Work item placed on the human review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReferral {
    pub application_id: ApplicationId,
    pub decision: CreditCardApplicationDecision,
    pub rationale: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewQueueError {
    #[error("review queue unavailable: {0}")]
    Transport(String),
}

/// Public representation of an application's status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    pub decision_rationale: String,
}
