use super::super::domain::CreditCardApplicationDecision;
use serde::{Deserialize, Serialize};

/// Step of the ordered policy that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionRule {
    FraudRisk,
    HighIncome,
    LicenseExpired,
    ValidatorUnavailable,
    InvalidFrequentFlyerNumber,
    YoungApplicant,
    LowIncome,
    DefaultReferral,
}

impl DecisionRule {
    pub const fn decision(self) -> CreditCardApplicationDecision {
        match self {
            DecisionRule::FraudRisk => CreditCardApplicationDecision::ReferredToHumanFraudRisk,
            DecisionRule::HighIncome => CreditCardApplicationDecision::AutoAccepted,
            DecisionRule::LowIncome => CreditCardApplicationDecision::AutoDeclined,
            DecisionRule::LicenseExpired
            | DecisionRule::ValidatorUnavailable
            | DecisionRule::InvalidFrequentFlyerNumber
            | DecisionRule::YoungApplicant
            | DecisionRule::DefaultReferral => CreditCardApplicationDecision::ReferredToHuman,
        }
    }

    pub fn summary(self) -> String {
        match self {
            DecisionRule::FraudRisk => "fraud lookup flagged the applicant".to_string(),
            DecisionRule::HighIncome => "gross income meets the auto-accept threshold".to_string(),
            DecisionRule::LicenseExpired => {
                "frequent flyer validator license expired".to_string()
            }
            DecisionRule::ValidatorUnavailable => {
                "frequent flyer validation could not be completed".to_string()
            }
            DecisionRule::InvalidFrequentFlyerNumber => {
                "frequent flyer number failed validation".to_string()
            }
            DecisionRule::YoungApplicant => "applicant below automated decision age".to_string(),
            DecisionRule::LowIncome => "gross income below the decline threshold".to_string(),
            DecisionRule::DefaultReferral => "no automated rule matched".to_string(),
        }
    }
}
