mod config;
mod policy;

pub use config::{
    EvaluationConfig, DEFAULT_AUTO_REFERRAL_MAX_AGE, DEFAULT_DETAILED_LOOKUP_MIN_AGE,
    DEFAULT_HIGH_INCOME_THRESHOLD, DEFAULT_LOW_INCOME_THRESHOLD,
};
pub use policy::DecisionRule;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{CreditCardApplication, CreditCardApplicationDecision, ValidationMode};
use super::fraud::FraudLookup;
use super::validator::{FrequentFlyerNumberValidator, LookupObserver};

/// Evaluator applying the ordered decision policy to one application at a time.
///
/// The evaluator registers a lookup observer with its validator on construction,
/// so [`validator_lookup_count`](Self::validator_lookup_count) tracks the lookups
/// this evaluator performed. Lookups made through other evaluators sharing the
/// validator are not counted.
///
/// Writing the validation mode and the lookup that depends on it happen under
/// one lock, so a shared evaluator can serve concurrent callers.
pub struct CreditCardApplicationEvaluator {
    validator: Arc<dyn FrequentFlyerNumberValidator>,
    fraud_lookup: Option<Arc<dyn FraudLookup>>,
    config: EvaluationConfig,
    lookups: Arc<LookupCounter>,
    lookup_gate: Mutex<()>,
}

impl CreditCardApplicationEvaluator {
    pub fn new(validator: Arc<dyn FrequentFlyerNumberValidator>) -> Self {
        Self::assemble(validator, None, EvaluationConfig::default())
    }

    pub fn with_fraud_lookup(
        validator: Arc<dyn FrequentFlyerNumberValidator>,
        fraud_lookup: Arc<dyn FraudLookup>,
    ) -> Self {
        Self::assemble(validator, Some(fraud_lookup), EvaluationConfig::default())
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    fn assemble(
        validator: Arc<dyn FrequentFlyerNumberValidator>,
        fraud_lookup: Option<Arc<dyn FraudLookup>>,
        config: EvaluationConfig,
    ) -> Self {
        let lookups = Arc::new(LookupCounter::default());
        validator.register_lookup_observer(lookups.clone());

        Self {
            validator,
            fraud_lookup,
            config,
            lookups,
            lookup_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Number of lookups the validator has reported since construction.
    pub fn validator_lookup_count(&self) -> u64 {
        self.lookups.count()
    }

    pub fn evaluate(&self, application: &CreditCardApplication) -> CreditCardApplicationDecision {
        self.assess(application).decision
    }

    /// Evaluate and report which rule produced the decision.
    pub fn assess(&self, application: &CreditCardApplication) -> EvaluationOutcome {
        let (rule, validation_mode) = self.match_rule(application);
        let outcome = EvaluationOutcome {
            decision: rule.decision(),
            rule,
            validation_mode,
        };

        debug!(
            decision = outcome.decision.label(),
            rule = ?outcome.rule,
            "credit card application evaluated"
        );

        outcome
    }

    fn match_rule(
        &self,
        application: &CreditCardApplication,
    ) -> (DecisionRule, Option<ValidationMode>) {
        if let Some(fraud_lookup) = &self.fraud_lookup {
            if fraud_lookup.is_fraud_risk(application) {
                return (DecisionRule::FraudRisk, None);
            }
        }

        if application.gross_annual_income >= self.config.high_income_threshold {
            return (DecisionRule::HighIncome, None);
        }

        if self.validator.service_information().license.is_expired() {
            return (DecisionRule::LicenseExpired, None);
        }

        let mode = if application.age >= self.config.detailed_lookup_min_age {
            ValidationMode::Detailed
        } else {
            ValidationMode::Quick
        };
        let lookup = {
            let _gate = self.lookup_gate.lock().expect("lookup gate mutex poisoned");
            self.validator.set_validation_mode(mode);
            self.lookups.attribute(|| {
                self.validator.is_valid(application.frequent_flyer_number.as_deref())
            })
        };

        let rule = match lookup {
            Err(error) => {
                warn!(
                    %error,
                    mode = mode.label(),
                    "frequent flyer validation failed, referring application"
                );
                DecisionRule::ValidatorUnavailable
            }
            Ok(false) => DecisionRule::InvalidFrequentFlyerNumber,
            Ok(true) if application.age <= self.config.auto_referral_max_age => {
                DecisionRule::YoungApplicant
            }
            Ok(true) if application.gross_annual_income < self.config.low_income_threshold => {
                DecisionRule::LowIncome
            }
            Ok(true) => DecisionRule::DefaultReferral,
        };

        (rule, Some(mode))
    }
}

/// Builder that validates collaborators and thresholds before use.
#[derive(Default)]
pub struct EvaluatorBuilder {
    validator: Option<Arc<dyn FrequentFlyerNumberValidator>>,
    fraud_lookup: Option<Arc<dyn FraudLookup>>,
    config: EvaluationConfig,
}

impl EvaluatorBuilder {
    pub fn validator(mut self, validator: Arc<dyn FrequentFlyerNumberValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn fraud_lookup(mut self, fraud_lookup: Arc<dyn FraudLookup>) -> Self {
        self.fraud_lookup = Some(fraud_lookup);
        self
    }

    pub fn config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CreditCardApplicationEvaluator, EvaluatorError> {
        let validator = self.validator.ok_or(EvaluatorError::MissingValidator)?;

        if self.config.low_income_threshold > self.config.high_income_threshold {
            return Err(EvaluatorError::InvalidThresholds {
                low: self.config.low_income_threshold,
                high: self.config.high_income_threshold,
            });
        }

        Ok(CreditCardApplicationEvaluator::assemble(
            validator,
            self.fraud_lookup,
            self.config,
        ))
    }
}

/// Configuration errors raised while building an evaluator.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("a frequent flyer number validator is required")]
    MissingValidator,
    #[error("low income threshold {low} exceeds high income threshold {high}")]
    InvalidThresholds { low: u64, high: u64 },
}

/// Decision plus the audit trail of how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub decision: CreditCardApplicationDecision,
    pub rule: DecisionRule,
    /// Mode written to the validator, when the lookup step was reached.
    pub validation_mode: Option<ValidationMode>,
}

impl EvaluationOutcome {
    pub fn rationale(&self) -> String {
        format!("{}: {}", self.decision.summary(), self.rule.summary())
    }
}

/// Counts notifications raised on the thread currently performing this
/// evaluator's lookup.
#[derive(Debug, Default)]
struct LookupCounter {
    count: AtomicU64,
    caller: Mutex<Option<ThreadId>>,
}

impl LookupCounter {
    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn attribute<T>(&self, lookup: impl FnOnce() -> T) -> T {
        self.set_caller(Some(thread::current().id()));
        let result = lookup();
        self.set_caller(None);
        result
    }

    fn set_caller(&self, caller: Option<ThreadId>) {
        *self.caller.lock().expect("lookup counter mutex poisoned") = caller;
    }
}

impl LookupObserver for LookupCounter {
    fn lookup_performed(&self) {
        let caller = *self.caller.lock().expect("lookup counter mutex poisoned");
        if caller == Some(thread::current().id()) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }
}
