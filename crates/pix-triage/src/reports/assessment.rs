//! Simplified, non-delegated scoring used by the report CRUD layer.
//!
//! This path predates the delegated scoring engine and uses its own weights,
//! a hard cap at 100, and the three-bucket status vocabulary. It is kept
//! deliberately separate from the four-tier rule table in
//! [`crate::scoring::rules`]; the two scorers are never merged.

use serde::Serialize;

use super::domain::{FraudReport, ReportStatus, RiskProfile};

const SCORE_CAP: u32 = 100;

/// Outcome of the simplified assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickAssessment {
    pub score: u32,
    pub status: ReportStatus,
    pub recommendations: Vec<String>,
}

/// Three-bucket status mapping from a numeric score.
pub fn status_for_score(score: u32) -> ReportStatus {
    if score > 70 {
        ReportStatus::HighRisk
    } else if score > 40 {
        ReportStatus::MediumRisk
    } else {
        ReportStatus::LowRisk
    }
}

/// Additive metadata-only score, capped at 100.
pub fn quick_score(report: &FraudReport) -> u32 {
    let mut score = 0;

    let prior = report.metadata.prior_payee_reports;
    if prior > 5 {
        score += 30;
    } else if prior > 2 {
        score += 20;
    } else if prior > 0 {
        score += 10;
    }

    let amount = report.transaction.amount;
    let average = report.metadata.payee_average_amount;
    if amount > average * 3.0 {
        score += 25;
    } else if amount > average * 2.0 {
        score += 15;
    }

    let account_score = report.payee.account.risk_score;
    if account_score < 300 {
        score += 20;
    } else if account_score < 600 {
        score += 10;
    }

    if report.metadata.device.new_device {
        score += 15;
    }

    if !report.metadata.payer_history_consistent {
        score += 10;
    }

    if report.payer.risk_profile == RiskProfile::High {
        score += 5;
    }

    score.min(SCORE_CAP)
}

fn quick_recommendations(score: u32, report: &FraudReport) -> Vec<String> {
    let mut actions: Vec<String> = if score > 70 {
        vec![
            "Block the payee account immediately".to_string(),
            "Open a special return (MED) request".to_string(),
            "Notify the competent authorities".to_string(),
        ]
    } else if score > 40 {
        vec![
            "Monitor transactions on the payee account".to_string(),
            "Request additional documentation".to_string(),
            "Await further evidence before acting".to_string(),
        ]
    } else {
        vec![
            "Keep the report under observation".to_string(),
            "Check consistency against related reports".to_string(),
        ]
    };

    if report.metadata.prior_payee_reports > 3 {
        actions.push("Payee account shows a suspicious report history".to_string());
    }

    actions
}

/// Run the simplified assessment for a report.
pub fn quick_assess(report: &FraudReport) -> QuickAssessment {
    let score = quick_score(report);
    QuickAssessment {
        score,
        status: status_for_score(score),
        recommendations: quick_recommendations(score, report),
    }
}
