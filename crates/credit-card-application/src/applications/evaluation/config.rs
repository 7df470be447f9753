use serde::{Deserialize, Serialize};

pub const DEFAULT_HIGH_INCOME_THRESHOLD: u64 = 100_000;
pub const DEFAULT_LOW_INCOME_THRESHOLD: u64 = 20_000;
pub const DEFAULT_AUTO_REFERRAL_MAX_AGE: u16 = 20;
pub const DEFAULT_DETAILED_LOOKUP_MIN_AGE: u16 = 30;

/// Thresholds driving the ordered decision policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Income at or above this is accepted without further checks.
    pub high_income_threshold: u64,
    /// Income below this is declined once the applicant passes validation.
    pub low_income_threshold: u64,
    /// Applicants at or below this age are always referred.
    pub auto_referral_max_age: u16,
    /// Applicants at or above this age get a detailed frequent flyer lookup.
    pub detailed_lookup_min_age: u16,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            high_income_threshold: DEFAULT_HIGH_INCOME_THRESHOLD,
            low_income_threshold: DEFAULT_LOW_INCOME_THRESHOLD,
            auto_referral_max_age: DEFAULT_AUTO_REFERRAL_MAX_AGE,
            detailed_lookup_min_age: DEFAULT_DETAILED_LOOKUP_MIN_AGE,
        }
    }
}
