//! Template loading and placeholder substitution for scoring prompts.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::rules;
use crate::reports::domain::FraudReport;

/// How [`PromptLibrary::render`] treats placeholders with no matching
/// variable.
///
/// The lenient default leaves them untouched, matching the historical
/// behavior of this pipeline; strict mode fails the attempt instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Errors raised while producing a prompt. Fatal to the scoring attempt:
/// there is no fallback for a missing or unusable template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("prompt template '{name}' could not be read")]
    TemplateNotFound {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("prompt left placeholder '{name}' unresolved")]
    UnresolvedPlaceholder { name: String },
}

/// Loads named templates from a directory and substitutes `{{NAME}}` tokens.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    dir: PathBuf,
    policy: PlaceholderPolicy,
}

impl PromptLibrary {
    pub fn new(dir: impl Into<PathBuf>, policy: PlaceholderPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    /// Read `<dir>/<name>.txt`.
    pub fn load(&self, name: &str) -> Result<String, RenderError> {
        let path = self.dir.join(format!("{name}.txt"));
        fs::read_to_string(&path).map_err(|source| RenderError::TemplateNotFound {
            name: name.to_string(),
            source,
        })
    }

    /// Replace every `{{KEY}}` occurrence (keys upper-cased) with the
    /// variable's string form.
    pub fn render(
        &self,
        template: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<String, RenderError> {
        let mut rendered = template.to_string();
        for (key, value) in variables {
            let placeholder = format!("{{{{{}}}}}", key.to_uppercase());
            rendered = rendered.replace(&placeholder, value);
        }

        if self.policy == PlaceholderPolicy::Strict {
            if let Some(name) = first_unresolved(&rendered) {
                return Err(RenderError::UnresolvedPlaceholder { name });
            }
        }

        Ok(rendered)
    }

    pub fn load_and_render(
        &self,
        name: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<String, RenderError> {
        let template = self.load(name)?;
        self.render(&template, variables)
    }
}

fn first_unresolved(text: &str) -> Option<String> {
    let start = text.find("{{")?;
    let rest = &text[start + 2..];
    let end = rest.find("}}")?;
    Some(rest[..end].to_string())
}

/// Derive the variable set the scoring template expects from a report.
pub fn scoring_variables(report: &FraudReport, now: DateTime<Utc>) -> BTreeMap<String, String> {
    let average = report.metadata.payee_average_amount;
    let ratio = if average > 0.0 {
        report.transaction.amount / average
    } else {
        0.0
    };

    let mut variables = BTreeMap::new();
    variables.insert("REPORT_ID".to_string(), report.report_id.0.clone());
    variables.insert(
        "AMOUNT".to_string(),
        format!("{:.2}", report.transaction.amount),
    );
    variables.insert(
        "PRIOR_REPORTS".to_string(),
        report.metadata.prior_payee_reports.to_string(),
    );
    variables.insert(
        "ACCOUNT_AGE_DAYS".to_string(),
        rules::account_age_days(report.payee.account.opened_at, now).to_string(),
    );
    variables.insert(
        "ACCOUNT_RISK_SCORE".to_string(),
        report.payee.account.risk_score.to_string(),
    );
    variables.insert(
        "PAYER_HISTORY_CONSISTENT".to_string(),
        report.metadata.payer_history_consistent.to_string(),
    );
    variables.insert(
        "NEW_DEVICE".to_string(),
        report.metadata.device.new_device.to_string(),
    );
    variables.insert("AMOUNT_RATIO".to_string(), format!("{ratio:.1}"));
    variables.insert(
        "PAYER_RISK_PROFILE".to_string(),
        report.payer.risk_profile.label().to_string(),
    );
    variables.insert(
        "NARRATIVE".to_string(),
        report.assessment.narrative.clone(),
    );
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn render_substitutes_every_provided_placeholder() {
        let library = PromptLibrary::new("prompts", PlaceholderPolicy::Lenient);
        let template = "Report {{REPORT_ID}} moved R$ {{AMOUNT}} ({{AMOUNT}}).";

        let rendered = library
            .render(template, &vars(&[("report_id", "REP-1"), ("amount", "150.00")]))
            .expect("render succeeds");

        assert_eq!(rendered, "Report REP-1 moved R$ 150.00 (150.00).");
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn lenient_policy_leaves_unknown_placeholders_untouched() {
        let library = PromptLibrary::new("prompts", PlaceholderPolicy::Lenient);

        let rendered = library
            .render("{{KNOWN}} and {{UNKNOWN}}", &vars(&[("known", "yes")]))
            .expect("render succeeds");

        assert_eq!(rendered, "yes and {{UNKNOWN}}");
    }

    #[test]
    fn strict_policy_rejects_unknown_placeholders() {
        let library = PromptLibrary::new("prompts", PlaceholderPolicy::Strict);

        let error = library
            .render("{{KNOWN}} and {{UNKNOWN}}", &vars(&[("known", "yes")]))
            .expect_err("strict render fails");

        match error {
            RenderError::UnresolvedPlaceholder { name } => assert_eq!(name, "UNKNOWN"),
            other => panic!("expected unresolved placeholder, got {other:?}"),
        }
    }

    #[test]
    fn missing_template_is_a_render_error() {
        let library = PromptLibrary::new("/nonexistent-prompt-dir", PlaceholderPolicy::Lenient);

        let error = library.load("fraud_analysis").expect_err("load fails");

        match error {
            RenderError::TemplateNotFound { name, .. } => assert_eq!(name, "fraud_analysis"),
            other => panic!("expected missing template, got {other:?}"),
        }
    }

    mod variables {
        use super::super::scoring_variables;
        use crate::reports::domain::{
            AnalysisMetadata, DeviceContext, FraudAssessment, FraudReport, InitiationChannel,
            Payee, PayeeAccount, Payer, RecordId, ReportId, ReportStatus, RiskProfile, Transaction,
        };
        use chrono::{Duration, TimeZone, Utc};

        #[test]
        fn derived_variables_use_the_documented_formats() {
            let now = Utc
                .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp");
            let report = FraudReport {
                record_id: RecordId("rel-000001".to_string()),
                report_id: ReportId("REP-9".to_string()),
                reported_at: now,
                status: ReportStatus::UnderReview,
                last_score: None,
                transaction: Transaction {
                    end_to_end_id: "E1".to_string(),
                    tx_id: "T1".to_string(),
                    amount: 50_000.0,
                    occurred_at: now,
                    initiation: InitiationChannel::PixKey,
                },
                payer: Payer {
                    tax_id: "1".to_string(),
                    name: "Payer".to_string(),
                    branch: "1".to_string(),
                    account_number: "1".to_string(),
                    institution: "Bank".to_string(),
                    risk_profile: RiskProfile::High,
                },
                payee: Payee {
                    tax_id: "2".to_string(),
                    name: "Payee".to_string(),
                    pix_key: "k".to_string(),
                    institution: "Bank".to_string(),
                    account: PayeeAccount {
                        branch: "1".to_string(),
                        number: "2".to_string(),
                        opened_at: now + Duration::hours(12),
                        risk_score: 15,
                    },
                },
                assessment: FraudAssessment {
                    reason: "r".to_string(),
                    scam_subtype: "s".to_string(),
                    narrative: "Disseram que era urgente.".to_string(),
                    evidence: Vec::new(),
                },
                metadata: AnalysisMetadata {
                    prior_payee_reports: 8,
                    payee_average_amount: 35_000.0,
                    payer_history_consistent: false,
                    device: DeviceContext {
                        device_id: "d".to_string(),
                        ip_address: "ip".to_string(),
                        new_device: true,
                    },
                },
                created_at: now,
                updated_at: now,
            };

            let variables = scoring_variables(&report, now);

            assert_eq!(variables["AMOUNT"], "50000.00");
            assert_eq!(variables["AMOUNT_RATIO"], "1.4");
            assert_eq!(variables["ACCOUNT_AGE_DAYS"], "-1");
            assert_eq!(variables["PAYER_RISK_PROFILE"], "ALTO");
            assert_eq!(variables["NARRATIVE"], "Disseram que era urgente.");
        }
    }
}
