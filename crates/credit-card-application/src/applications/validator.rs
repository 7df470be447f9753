use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};

use super::domain::ValidationMode;

/// License key reported by validators whose automated lookups are no longer permitted.
pub const EXPIRED_LICENSE_KEY: &str = "EXPIRED";

/// External authority that validates frequent flyer numbers.
///
/// Implementations must notify every registered [`LookupObserver`] once per
/// [`is_valid`](FrequentFlyerNumberValidator::is_valid) invocation, whether or
/// not the lookup succeeds, on the thread that called `is_valid` and before it
/// returns. [`LookupObservers`] covers the bookkeeping.
pub trait FrequentFlyerNumberValidator: Send + Sync {
    fn is_valid(&self, frequent_flyer_number: Option<&str>) -> Result<bool, ValidatorError>;
    fn validation_mode(&self) -> ValidationMode;
    fn set_validation_mode(&self, mode: ValidationMode);
    fn service_information(&self) -> ServiceInformation;
    fn register_lookup_observer(&self, observer: Arc<dyn LookupObserver>);
}

/// Receives a signal each time a validator performs a lookup.
pub trait LookupObserver: Send + Sync {
    fn lookup_performed(&self);
}

/// Service metadata exposed by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInformation {
    pub license: LicenseData,
}

impl ServiceInformation {
    pub fn with_license_key(license_key: impl Into<String>) -> Self {
        Self {
            license: LicenseData {
                license_key: license_key.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseData {
    pub license_key: String,
}

impl LicenseData {
    pub fn is_expired(&self) -> bool {
        self.license_key == EXPIRED_LICENSE_KEY
    }
}

/// Failure raised while contacting the validation authority.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("frequent flyer service unavailable: {0}")]
    Unavailable(String),
    #[error("frequent flyer lookup failed: {0}")]
    Lookup(String),
}

/// Observer registry validators embed to satisfy the notification contract.
///
/// Observers are held weakly, so dropping the owner of an observer ends its
/// registration.
#[derive(Default)]
pub struct LookupObservers {
    observers: Mutex<Vec<Weak<dyn LookupObserver>>>,
}

impl LookupObservers {
    pub fn register(&self, observer: Arc<dyn LookupObserver>) {
        let mut observers = self.observers.lock().expect("observer mutex poisoned");
        observers.retain(|registered| registered.strong_count() > 0);
        observers.push(Arc::downgrade(&observer));
    }

    pub fn notify(&self) {
        let live: Vec<Arc<dyn LookupObserver>> = {
            let mut observers = self.observers.lock().expect("observer mutex poisoned");
            observers.retain(|registered| registered.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.lookup_performed();
        }
    }

    /// Number of registered observers that are still alive.
    pub fn len(&self) -> usize {
        self.observers
            .lock()
            .expect("observer mutex poisoned")
            .iter()
            .filter(|registered| registered.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LookupObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupObservers")
            .field("registered", &self.len())
            .finish()
    }
}
