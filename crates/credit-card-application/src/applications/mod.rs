//! Credit card application intake, evaluation, and human review routing.
//!
//! The evaluator applies a fixed, ordered policy over a handful of applicant
//! fields and two collaborators: a frequent flyer number validator and an
//! optional fraud lookup. The service and router wrap it with storage and HTTP.

pub mod domain;
pub mod evaluation;
pub mod fraud;
pub mod repository;
pub mod router;
pub mod service;
pub mod validator;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, CreditCardApplication, CreditCardApplicationDecision,
    ValidationMode,
};
pub use evaluation::{
    CreditCardApplicationEvaluator, DecisionRule, EvaluationConfig, EvaluationOutcome,
    EvaluatorBuilder, EvaluatorError,
};
pub use fraud::{FraudLookup, SurnameWatchList};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
    ReviewQueue, ReviewQueueError, ReviewReferral,
};
pub use router::application_router;
pub use service::{ApplicationServiceError, CreditCardApplicationService};
pub use validator::{
    FrequentFlyerNumberValidator, LicenseData, LookupObserver, LookupObservers,
    ServiceInformation, ValidatorError, EXPIRED_LICENSE_KEY,
};
