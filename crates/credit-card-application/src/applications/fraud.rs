use super::domain::CreditCardApplication;

/// Pluggable fraud screening policy consulted before any other rule.
pub trait FraudLookup: Send + Sync {
    fn is_fraud_risk(&self, application: &CreditCardApplication) -> bool;
}

impl<F> FraudLookup for F
where
    F: Fn(&CreditCardApplication) -> bool + Send + Sync,
{
    fn is_fraud_risk(&self, application: &CreditCardApplication) -> bool {
        self(application)
    }
}

const DEFAULT_WATCHED_SURNAME: &str = "Smith";

/// Flags applicants whose last name exactly matches a watched surname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurnameWatchList {
    surnames: Vec<String>,
}

impl SurnameWatchList {
    pub fn new<I, S>(surnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            surnames: surnames.into_iter().map(Into::into).collect(),
        }
    }

    pub fn surnames(&self) -> &[String] {
        &self.surnames
    }
}

impl Default for SurnameWatchList {
    fn default() -> Self {
        Self::new([DEFAULT_WATCHED_SURNAME])
    }
}

impl FraudLookup for SurnameWatchList {
    fn is_fraud_risk(&self, application: &CreditCardApplication) -> bool {
        match application.last_name.as_deref() {
            Some(last_name) => self.surnames.iter().any(|watched| watched == last_name),
            None => false,
        }
    }
}
