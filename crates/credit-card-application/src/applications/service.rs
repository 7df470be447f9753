use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{ApplicationId, ApplicationStatus, CreditCardApplication};
use super::evaluation::{CreditCardApplicationEvaluator, EvaluationOutcome};
use super::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError, ReviewQueue, ReviewQueueError,
    ReviewReferral,
};

/// Service composing the evaluator, repository, and human review queue.
pub struct CreditCardApplicationService<R, Q> {
    evaluator: Arc<CreditCardApplicationEvaluator>,
    repository: Arc<R>,
    review_queue: Arc<Q>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("cc-{id:06}"))
}

impl<R, Q> CreditCardApplicationService<R, Q>
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    pub fn new(
        evaluator: Arc<CreditCardApplicationEvaluator>,
        repository: Arc<R>,
        review_queue: Arc<Q>,
    ) -> Self {
        Self {
            evaluator,
            repository,
            review_queue,
        }
    }

    /// Submit a new application, returning the repository-backed record.
    pub fn submit(
        &self,
        application: CreditCardApplication,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = ApplicationRecord {
            application_id: next_application_id(),
            application,
            status: ApplicationStatus::Submitted,
            evaluation: None,
            submitted_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(application_id = %stored.application_id.0, "credit card application submitted");
        Ok(stored)
    }

    /// Evaluate a stored application, persist the outcome, and queue referrals.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
    ) -> Result<EvaluationOutcome, ApplicationServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let outcome = self.evaluator.assess(&record.application);

        record.status = ApplicationStatus::from(outcome.decision);
        record.evaluation = Some(outcome.clone());
        self.repository.update(record)?;

        info!(
            application_id = %application_id.0,
            decision = outcome.decision.label(),
            "credit card application decided"
        );

        if outcome.decision.is_referral() {
            self.review_queue.enqueue(ReviewReferral {
                application_id: application_id.clone(),
                decision: outcome.decision,
                rationale: outcome.rationale(),
            })?;
        }

        Ok(outcome)
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Applications currently awaiting a human underwriter.
    pub fn referred(&self, limit: usize) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self.repository.referred(limit)?)
    }

    pub fn validator_lookup_count(&self) -> u64 {
        self.evaluator.validator_lookup_count()
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    ReviewQueue(#[from] ReviewQueueError),
}
