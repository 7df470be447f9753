use crate::infra::{build_evaluator, InMemoryApplicationRepository, InMemoryReviewQueue};
use chrono::Utc;
use clap::Args;
use credit_card_application::applications::{
    CreditCardApplication, CreditCardApplicationService, EvaluationOutcome,
};
use credit_card_application::config::AppConfig;
use credit_card_application::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Gross annual income in whole currency units
    #[arg(long, default_value_t = 0)]
    pub(crate) income: u64,
    /// Applicant age in years
    #[arg(long, default_value_t = 0)]
    pub(crate) age: u16,
    /// Frequent flyer number to validate
    #[arg(long)]
    pub(crate) frequent_flyer_number: Option<String>,
    /// Applicant last name, consulted by the fraud lookup
    #[arg(long)]
    pub(crate) last_name: Option<String>,
    /// Override the validator license key (use EXPIRED to simulate a lapsed license)
    #[arg(long)]
    pub(crate) license_key: Option<String>,
    /// Disable the surname fraud lookup
    #[arg(long)]
    pub(crate) no_fraud_check: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the validator license key for the demo run
    #[arg(long)]
    pub(crate) license_key: Option<String>,
    /// Disable the surname fraud lookup
    #[arg(long)]
    pub(crate) no_fraud_check: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        income,
        age,
        frequent_flyer_number,
        last_name,
        license_key,
        no_fraud_check,
    } = args;

    let config = AppConfig::load()?;
    let license_key = license_key.unwrap_or(config.validator.license_key);
    let evaluator = build_evaluator(&license_key, config.evaluation, !no_fraud_check)?;

    let application = CreditCardApplication {
        gross_annual_income: income,
        age,
        frequent_flyer_number,
        last_name,
    };
    let outcome = evaluator.assess(&application);

    println!("Decision: {}", outcome.decision.label());
    print_outcome(&outcome);
    println!("Validator lookups: {}", evaluator.validator_lookup_count());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        license_key,
        no_fraud_check,
    } = args;

    let config = AppConfig::load()?;
    let license_key = license_key.unwrap_or(config.validator.license_key);
    let evaluator = Arc::new(build_evaluator(
        &license_key,
        config.evaluation,
        !no_fraud_check,
    )?);

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let queue = Arc::new(InMemoryReviewQueue::default());
    let service = CreditCardApplicationService::new(evaluator, repository, queue.clone());

    println!(
        "Credit card decisioning demo ({})",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    println!("Validator license key: {license_key}");

    for (label, application) in demo_applications() {
        let record = match service.submit(application) {
            Ok(record) => record,
            Err(err) => {
                println!("- {label}: submission rejected ({err})");
                continue;
            }
        };

        match service.evaluate(&record.application_id) {
            Ok(outcome) => {
                println!(
                    "- {label} [{}] -> {}",
                    record.application_id.0,
                    outcome.decision.label()
                );
                print_outcome(&outcome);
            }
            Err(err) => println!("- {label}: evaluation unavailable ({err})"),
        }
    }

    let referrals = queue.referrals();
    if referrals.is_empty() {
        println!("\nHuman review queue: empty");
    } else {
        println!("\nHuman review queue:");
        for referral in referrals {
            println!(
                "  - {} ({}): {}",
                referral.application_id.0,
                referral.decision.label(),
                referral.rationale
            );
        }
    }
    println!("Validator lookups: {}", service.validator_lookup_count());

    Ok(())
}

fn print_outcome(outcome: &EvaluationOutcome) {
    println!("  Rule: {:?} ({})", outcome.rule, outcome.rule.summary());
    if let Some(mode) = outcome.validation_mode {
        println!("  Frequent flyer lookup: {}", mode.label());
    }
}

fn demo_applications() -> Vec<(&'static str, CreditCardApplication)> {
    vec![
        (
            "high income",
            CreditCardApplication {
                gross_annual_income: 100_000,
                ..CreditCardApplication::default()
            },
        ),
        (
            "young applicant",
            CreditCardApplication {
                age: 19,
                frequent_flyer_number: Some("QF777".to_string()),
                ..CreditCardApplication::default()
            },
        ),
        (
            "low income adult",
            CreditCardApplication {
                gross_annual_income: 19_999,
                age: 42,
                frequent_flyer_number: Some("BA1234".to_string()),
                last_name: Some("Okafor".to_string()),
            },
        ),
        (
            "unregistered member",
            CreditCardApplication {
                gross_annual_income: 45_000,
                age: 38,
                frequent_flyer_number: Some("ZZ0000".to_string()),
                last_name: Some("Lind".to_string()),
            },
        ),
        (
            "watch list surname",
            CreditCardApplication {
                gross_annual_income: 180_000,
                age: 51,
                frequent_flyer_number: Some("UA55501".to_string()),
                last_name: Some("Smith".to_string()),
            },
        ),
        ("defaults only", CreditCardApplication::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_card_application::applications::{
        CreditCardApplicationDecision, EvaluationConfig,
    };

    #[test]
    fn demo_applications_cover_every_decision() {
        let evaluator =
            build_evaluator("OK", EvaluationConfig::default(), true).expect("evaluator builds");

        let decisions: Vec<CreditCardApplicationDecision> = demo_applications()
            .iter()
            .map(|(_, application)| evaluator.evaluate(application))
            .collect();

        assert_eq!(
            decisions,
            vec![
                CreditCardApplicationDecision::AutoAccepted,
                CreditCardApplicationDecision::ReferredToHuman,
                CreditCardApplicationDecision::AutoDeclined,
                CreditCardApplicationDecision::ReferredToHuman,
                CreditCardApplicationDecision::ReferredToHumanFraudRisk,
                CreditCardApplicationDecision::ReferredToHuman,
            ]
        );
    }
}
