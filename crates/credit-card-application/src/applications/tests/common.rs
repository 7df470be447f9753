use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::applications::domain::{
    ApplicationId, ApplicationStatus, CreditCardApplication, ValidationMode,
};
use crate::applications::evaluation::CreditCardApplicationEvaluator;
use crate::applications::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError, ReviewQueue, ReviewQueueError,
    ReviewReferral,
};
use crate::applications::validator::{
    FrequentFlyerNumberValidator, LookupObserver, LookupObservers, ServiceInformation,
    ValidatorError,
};
use crate::applications::{application_router, CreditCardApplicationService};

type NumberPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

enum ScriptedResponse {
    Valid(bool),
    Fail(String),
}

/// Validator double with scripted answers and a log of every interaction.
pub(super) struct ScriptedValidator {
    license_key: String,
    fallback: ScriptedResponse,
    sequence: Mutex<VecDeque<ScriptedResponse>>,
    predicate: Option<NumberPredicate>,
    mode: Mutex<ValidationMode>,
    mode_writes: Mutex<Vec<ValidationMode>>,
    license_reads: AtomicUsize,
    calls: Mutex<Vec<Option<String>>>,
    observers: LookupObservers,
}

impl ScriptedValidator {
    fn with_fallback(fallback: ScriptedResponse) -> Self {
        Self {
            license_key: "OK".to_string(),
            fallback,
            sequence: Mutex::new(VecDeque::new()),
            predicate: None,
            mode: Mutex::new(ValidationMode::default()),
            mode_writes: Mutex::new(Vec::new()),
            license_reads: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            observers: LookupObservers::default(),
        }
    }

    pub(super) fn accepting() -> Self {
        Self::with_fallback(ScriptedResponse::Valid(true))
    }

    pub(super) fn rejecting() -> Self {
        Self::with_fallback(ScriptedResponse::Valid(false))
    }

    pub(super) fn failing(message: &str) -> Self {
        Self::with_fallback(ScriptedResponse::Fail(message.to_string()))
    }

    /// Valid only for present numbers satisfying `predicate`.
    pub(super) fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let mut validator = Self::rejecting();
        validator.predicate = Some(Box::new(predicate));
        validator
    }

    pub(super) fn with_license_key(mut self, license_key: &str) -> Self {
        self.license_key = license_key.to_string();
        self
    }

    /// Answers consumed in order before falling back to the default response.
    pub(super) fn with_sequence<I>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.sequence
            .lock()
            .expect("sequence mutex poisoned")
            .extend(answers.into_iter().map(ScriptedResponse::Valid));
        self
    }

    pub(super) fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn mode_writes(&self) -> Vec<ValidationMode> {
        self.mode_writes
            .lock()
            .expect("mode mutex poisoned")
            .clone()
    }

    pub(super) fn license_reads(&self) -> usize {
        self.license_reads.load(Ordering::SeqCst)
    }

    pub(super) fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl FrequentFlyerNumberValidator for ScriptedValidator {
    fn is_valid(&self, frequent_flyer_number: Option<&str>) -> Result<bool, ValidatorError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(frequent_flyer_number.map(str::to_string));
        self.observers.notify();

        let scripted = self
            .sequence
            .lock()
            .expect("sequence mutex poisoned")
            .pop_front();

        match scripted.as_ref().unwrap_or(&self.fallback) {
            ScriptedResponse::Fail(message) => Err(ValidatorError::Lookup(message.clone())),
            ScriptedResponse::Valid(answer) => match &self.predicate {
                Some(predicate) => Ok(frequent_flyer_number
                    .map(|number| predicate(number))
                    .unwrap_or(false)),
                None => Ok(*answer),
            },
        }
    }

    fn validation_mode(&self) -> ValidationMode {
        *self.mode.lock().expect("mode mutex poisoned")
    }

    fn set_validation_mode(&self, mode: ValidationMode) {
        *self.mode.lock().expect("mode mutex poisoned") = mode;
        self.mode_writes
            .lock()
            .expect("mode mutex poisoned")
            .push(mode);
    }

    fn service_information(&self) -> ServiceInformation {
        self.license_reads.fetch_add(1, Ordering::SeqCst);
        ServiceInformation::with_license_key(self.license_key.clone())
    }

    fn register_lookup_observer(&self, observer: Arc<dyn LookupObserver>) {
        self.observers.register(observer);
    }
}

/// Validator that pauses its first lookup until released and answers from the
/// mode it observes once resumed: valid in quick mode, invalid in detailed mode.
pub(super) struct GatedValidator {
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    mode: Mutex<ValidationMode>,
    observers: LookupObservers,
}

impl GatedValidator {
    /// Returns the validator, a receiver signalled once the first lookup is
    /// paused, and the sender that resumes it.
    pub(super) fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let validator = Self {
            gate: Mutex::new(Some((entered_tx, release_rx))),
            mode: Mutex::new(ValidationMode::default()),
            observers: LookupObservers::default(),
        };
        (validator, entered_rx, release_tx)
    }
}

impl FrequentFlyerNumberValidator for GatedValidator {
    fn is_valid(&self, _frequent_flyer_number: Option<&str>) -> Result<bool, ValidatorError> {
        let gate = self.gate.lock().expect("gate mutex poisoned").take();
        if let Some((entered, release)) = gate {
            entered.send(()).expect("test awaits the paused lookup");
            release.recv().expect("test releases the paused lookup");
        }
        self.observers.notify();
        Ok(self.validation_mode() == ValidationMode::Quick)
    }

    fn validation_mode(&self) -> ValidationMode {
        *self.mode.lock().expect("mode mutex poisoned")
    }

    fn set_validation_mode(&self, mode: ValidationMode) {
        *self.mode.lock().expect("mode mutex poisoned") = mode;
    }

    fn service_information(&self) -> ServiceInformation {
        ServiceInformation::with_license_key("OK")
    }

    fn register_lookup_observer(&self, observer: Arc<dyn LookupObserver>) {
        self.observers.register(observer);
    }
}

pub(super) fn application(gross_annual_income: u64, age: u16) -> CreditCardApplication {
    CreditCardApplication {
        gross_annual_income,
        age,
        ..CreditCardApplication::default()
    }
}

pub(super) fn evaluator_for(validator: &Arc<ScriptedValidator>) -> CreditCardApplicationEvaluator {
    CreditCardApplicationEvaluator::new(validator.clone())
}

pub(super) fn build_service(
    validator: Arc<ScriptedValidator>,
) -> (
    CreditCardApplicationService<MemoryRepository, MemoryReviewQueue>,
    Arc<MemoryRepository>,
    Arc<MemoryReviewQueue>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let queue = Arc::new(MemoryReviewQueue::default());
    let evaluator = Arc::new(CreditCardApplicationEvaluator::new(validator));
    let service = CreditCardApplicationService::new(evaluator, repository.clone(), queue.clone());
    (service, repository, queue)
}

pub(super) fn service_with<R, Q>(
    repository: R,
    queue: Q,
) -> CreditCardApplicationService<R, Q>
where
    R: ApplicationRepository + 'static,
    Q: ReviewQueue + 'static,
{
    let evaluator = Arc::new(CreditCardApplicationEvaluator::new(Arc::new(
        ScriptedValidator::accepting(),
    )));
    CreditCardApplicationService::new(evaluator, Arc::new(repository), Arc::new(queue))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn referred(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == ApplicationStatus::Referred)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReviewQueue {
    referrals: Arc<Mutex<Vec<ReviewReferral>>>,
}

impl MemoryReviewQueue {
    pub(super) fn referrals(&self) -> Vec<ReviewReferral> {
        self.referrals.lock().expect("queue mutex poisoned").clone()
    }
}

impl ReviewQueue for MemoryReviewQueue {
    fn enqueue(&self, referral: ReviewReferral) -> Result<(), ReviewQueueError> {
        self.referrals
            .lock()
            .expect("queue mutex poisoned")
            .push(referral);
        Ok(())
    }
}

pub(super) struct OfflineReviewQueue;

impl ReviewQueue for OfflineReviewQueue {
    fn enqueue(&self, _referral: ReviewReferral) -> Result<(), ReviewQueueError> {
        Err(ReviewQueueError::Transport("underwriting desk offline".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn referred(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn referred(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn application_router_with_service(
    service: CreditCardApplicationService<MemoryRepository, MemoryReviewQueue>,
) -> axum::Router {
    application_router(Arc::new(service))
}
