use credit_card_application::applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus,
    CreditCardApplicationEvaluator, EvaluationConfig, EvaluatorError,
    FrequentFlyerNumberValidator, LookupObserver, LookupObservers, RepositoryError, ReviewQueue,
    ReviewQueueError, ReviewReferral, ServiceInformation, SurnameWatchList, ValidationMode,
    ValidatorError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        if guard.contains_key(&record.application_id) {
            guard.insert(record.application_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn referred(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut referred: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.status == ApplicationStatus::Referred)
            .cloned()
            .collect();
        referred.sort_by_key(|record| record.submitted_at);
        referred.truncate(limit);
        Ok(referred)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewQueue {
    referrals: Arc<Mutex<Vec<ReviewReferral>>>,
}

impl ReviewQueue for InMemoryReviewQueue {
    fn enqueue(&self, referral: ReviewReferral) -> Result<(), ReviewQueueError> {
        let mut guard = self.referrals.lock().expect("review queue mutex poisoned");
        guard.push(referral);
        Ok(())
    }
}

impl InMemoryReviewQueue {
    pub(crate) fn referrals(&self) -> Vec<ReviewReferral> {
        self.referrals
            .lock()
            .expect("review queue mutex poisoned")
            .clone()
    }
}

/// Frequent flyer registry held in memory.
///
/// Quick lookups only check the number's shape; detailed lookups also require
/// a registered membership.
pub(crate) struct FrequentFlyerRegistry {
    members: BTreeSet<String>,
    license_key: String,
    mode: Mutex<ValidationMode>,
    observers: LookupObservers,
}

impl FrequentFlyerRegistry {
    pub(crate) fn new<I, S>(license_key: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            license_key: license_key.into(),
            mode: Mutex::new(ValidationMode::default()),
            observers: LookupObservers::default(),
        }
    }
}

impl FrequentFlyerNumberValidator for FrequentFlyerRegistry {
    fn is_valid(&self, frequent_flyer_number: Option<&str>) -> Result<bool, ValidatorError> {
        self.observers.notify();

        let Some(number) = frequent_flyer_number else {
            return Ok(false);
        };
        if number
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ValidatorError::Lookup(format!(
                "number '{}' contains unsupported characters",
                number.escape_debug()
            )));
        }

        let well_formed = !number.is_empty() && number.chars().all(|c| c.is_ascii_alphanumeric());
        let mode = self.validation_mode();
        let valid = match mode {
            ValidationMode::Quick => well_formed,
            ValidationMode::Detailed => well_formed && self.members.contains(number),
        };

        debug!(mode = mode.label(), valid, "frequent flyer lookup performed");
        Ok(valid)
    }

    fn validation_mode(&self) -> ValidationMode {
        *self.mode.lock().expect("validator mutex poisoned")
    }

    fn set_validation_mode(&self, mode: ValidationMode) {
        *self.mode.lock().expect("validator mutex poisoned") = mode;
    }

    fn service_information(&self) -> ServiceInformation {
        ServiceInformation::with_license_key(self.license_key.clone())
    }

    fn register_lookup_observer(&self, observer: Arc<dyn LookupObserver>) {
        self.observers.register(observer);
    }
}

pub(crate) fn registered_members() -> Vec<&'static str> {
    vec!["BA1234", "QF777", "UA55501", "LH90210"]
}

pub(crate) fn build_evaluator(
    license_key: &str,
    config: EvaluationConfig,
    fraud_check: bool,
) -> Result<CreditCardApplicationEvaluator, EvaluatorError> {
    let registry = FrequentFlyerRegistry::new(license_key, registered_members());
    let builder = CreditCardApplicationEvaluator::builder()
        .validator(Arc::new(registry))
        .config(config);

    let builder = if fraud_check {
        builder.fraud_lookup(Arc::new(SurnameWatchList::default()))
    } else {
        builder
    };

    builder.build()
}
