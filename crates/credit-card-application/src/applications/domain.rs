use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Applicant provided fields consumed by the evaluator.
///
/// Every field has a default so partially filled submissions still evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditCardApplication {
    pub gross_annual_income: u64,
    pub age: u16,
    pub frequent_flyer_number: Option<String>,
    pub last_name: Option<String>,
}

/// Outcome of a single evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditCardApplicationDecision {
    AutoAccepted,
    AutoDeclined,
    ReferredToHuman,
    ReferredToHumanFraudRisk,
}

impl CreditCardApplicationDecision {
    pub const fn label(self) -> &'static str {
        match self {
            CreditCardApplicationDecision::AutoAccepted => "auto_accepted",
            CreditCardApplicationDecision::AutoDeclined => "auto_declined",
            CreditCardApplicationDecision::ReferredToHuman => "referred_to_human",
            CreditCardApplicationDecision::ReferredToHumanFraudRisk => {
                "referred_to_human_fraud_risk"
            }
        }
    }

    pub fn summary(self) -> String {
        match self {
            CreditCardApplicationDecision::AutoAccepted => "application auto-accepted".to_string(),
            CreditCardApplicationDecision::AutoDeclined => "application auto-declined".to_string(),
            CreditCardApplicationDecision::ReferredToHuman => {
                "referred for human review".to_string()
            }
            CreditCardApplicationDecision::ReferredToHumanFraudRisk => {
                "referred for human review (fraud risk)".to_string()
            }
        }
    }

    /// True when the decision needs a human underwriter.
    pub const fn is_referral(self) -> bool {
        matches!(
            self,
            CreditCardApplicationDecision::ReferredToHuman
                | CreditCardApplicationDecision::ReferredToHumanFraudRisk
        )
    }
}

/// Depth of the frequent flyer lookup requested from the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationMode {
    #[default]
    Quick,
    Detailed,
}

impl ValidationMode {
    pub const fn label(self) -> &'static str {
        match self {
            ValidationMode::Quick => "quick",
            ValidationMode::Detailed => "detailed",
        }
    }
}

/// High level status tracked for a stored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    Accepted,
    Declined,
    Referred,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Referred => "referred",
        }
    }
}

impl From<CreditCardApplicationDecision> for ApplicationStatus {
    fn from(decision: CreditCardApplicationDecision) -> Self {
        match decision {
            CreditCardApplicationDecision::AutoAccepted => ApplicationStatus::Accepted,
            CreditCardApplicationDecision::AutoDeclined => ApplicationStatus::Declined,
            CreditCardApplicationDecision::ReferredToHuman
            | CreditCardApplicationDecision::ReferredToHumanFraudRisk => {
                ApplicationStatus::Referred
            }
        }
    }
}
