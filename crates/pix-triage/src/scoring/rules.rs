//! Deterministic rule evaluation for fraud reports.
//!
//! The additive point table below is the canonical rule set: it is the
//! reference embedded in the scoring prompt, and it backs the offline
//! assessment path. The reduced two-rule variant in [`fallback_result`] is
//! what runs when delegation to the language-model backend fails; it stays a
//! deliberately small subset so the failure path remains trivially auditable.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RiskTier, ScoreResult, ScoreSource};
use crate::reports::domain::{FraudReport, RiskProfile};

/// Social-engineering vocabulary matched against the user narrative.
///
/// Terms are Portuguese because narratives are; matching is a
/// case-insensitive substring check and each term counts at most once.
pub const SUSPICIOUS_KEYWORDS: [&str; 17] = [
    "urgente",
    "seguro",
    "central",
    "gerente",
    "invadida",
    "ajuda",
    "proteção",
    "bloqueio",
    "emergência",
    "suspensão",
    "verificação",
    "confirmar",
    "dados",
    "senha",
    "token",
    "código",
    "autenticação",
];

pub const POINTS_PRIOR_REPORTS: u32 = 40;
pub const POINTS_REPEAT_TARGET: u32 = 60;
pub const POINTS_YOUNG_ACCOUNT: u32 = 30;
pub const POINTS_BRAND_NEW_ACCOUNT: u32 = 20;
pub const POINTS_INCONSISTENT_HISTORY: u32 = 15;
pub const POINTS_AMOUNT_DEVIATION: u32 = 25;
pub const POINTS_NEW_DEVICE: u32 = 20;
pub const POINTS_PER_KEYWORD: u32 = 5;
pub const POINTS_LOW_ACCOUNT_SCORE: u32 = 20;
pub const POINTS_MID_ACCOUNT_SCORE: u32 = 10;
pub const POINTS_HIGH_RISK_PAYER: u32 = 15;

pub const YOUNG_ACCOUNT_DAYS: i64 = 30;
pub const BRAND_NEW_ACCOUNT_DAYS: i64 = 7;
pub const LOW_ACCOUNT_SCORE: i64 = 300;
pub const MID_ACCOUNT_SCORE: i64 = 600;
pub const AMOUNT_DEVIATION_FACTOR: f64 = 3.0;

/// Confidence reported by every fallback evaluation.
pub const FALLBACK_CONFIDENCE: u8 = 50;

const FALLBACK_MODEL: &str = "local-rules";

/// Which rule produced a score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSignal {
    PriorReports,
    RepeatTarget,
    AccountAge,
    PayerHistory,
    AmountDeviation,
    NewDevice,
    NarrativeLanguage,
    AccountScore,
    PayerProfile,
}

/// Discrete contribution to an evaluation, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalHit {
    pub signal: RiskSignal,
    pub points: u32,
    pub note: String,
}

/// Full output of the canonical rule table for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBreakdown {
    pub total: u32,
    pub hits: Vec<SignalHit>,
}

impl RuleBreakdown {
    pub fn red_flags(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.note.clone()).collect()
    }
}

/// Whole days elapsed since the account was opened, floored.
///
/// Negative values (opening date in the future) are permitted and read as an
/// anomaly signal by the age rules.
pub fn account_age_days(opened_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - opened_at).num_seconds().div_euclid(86_400)
}

/// Vocabulary terms present in the narrative, each at most once.
pub fn matched_keywords(narrative: &str) -> Vec<&'static str> {
    let haystack = narrative.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(*keyword))
        .copied()
        .collect()
}

/// Apply the canonical additive point table to a report.
pub fn evaluate(report: &FraudReport, now: DateTime<Utc>) -> RuleBreakdown {
    let mut hits = Vec::new();
    let mut push = |signal, points, note: String| {
        hits.push(SignalHit {
            signal,
            points,
            note,
        });
    };

    let prior = report.metadata.prior_payee_reports;
    if prior > 0 {
        push(
            RiskSignal::PriorReports,
            POINTS_PRIOR_REPORTS,
            format!("payee named in {prior} prior fraud report(s)"),
        );
    }
    if prior > 3 {
        push(
            RiskSignal::RepeatTarget,
            POINTS_REPEAT_TARGET,
            "payee named in more than three prior fraud reports".to_string(),
        );
    }

    let age_days = account_age_days(report.payee.account.opened_at, now);
    if age_days < YOUNG_ACCOUNT_DAYS {
        push(
            RiskSignal::AccountAge,
            POINTS_YOUNG_ACCOUNT,
            format!("payee account opened {age_days} day(s) ago"),
        );
    }
    if age_days < BRAND_NEW_ACCOUNT_DAYS {
        push(
            RiskSignal::AccountAge,
            POINTS_BRAND_NEW_ACCOUNT,
            "payee account opened within the last week".to_string(),
        );
    }

    if !report.metadata.payer_history_consistent {
        push(
            RiskSignal::PayerHistory,
            POINTS_INCONSISTENT_HISTORY,
            "transaction inconsistent with payer history".to_string(),
        );
    }

    let average = report.metadata.payee_average_amount;
    if report.transaction.amount > AMOUNT_DEVIATION_FACTOR * average {
        push(
            RiskSignal::AmountDeviation,
            POINTS_AMOUNT_DEVIATION,
            format!(
                "amount {:.2} exceeds 3x the payee average of {:.2}",
                report.transaction.amount, average
            ),
        );
    }

    if report.metadata.device.new_device {
        push(
            RiskSignal::NewDevice,
            POINTS_NEW_DEVICE,
            "transaction initiated from a new device".to_string(),
        );
    }

    let keywords = matched_keywords(&report.assessment.narrative);
    if !keywords.is_empty() {
        push(
            RiskSignal::NarrativeLanguage,
            POINTS_PER_KEYWORD * keywords.len() as u32,
            format!("narrative contains suspicious terms: {}", keywords.join(", ")),
        );
    }

    let account_score = report.payee.account.risk_score;
    if account_score < LOW_ACCOUNT_SCORE {
        push(
            RiskSignal::AccountScore,
            POINTS_LOW_ACCOUNT_SCORE,
            format!("payee account risk score {account_score} is below {LOW_ACCOUNT_SCORE}"),
        );
    } else if account_score < MID_ACCOUNT_SCORE {
        push(
            RiskSignal::AccountScore,
            POINTS_MID_ACCOUNT_SCORE,
            format!("payee account risk score {account_score} is below {MID_ACCOUNT_SCORE}"),
        );
    }

    if report.payer.risk_profile == RiskProfile::High {
        push(
            RiskSignal::PayerProfile,
            POINTS_HIGH_RISK_PAYER,
            "payer carries a high risk profile".to_string(),
        );
    }

    let total = hits.iter().map(|hit| hit.points).sum();
    RuleBreakdown { total, hits }
}

/// Fixed tier-keyed action texts, with one extra entry for repeat targets.
pub fn recommendations(tier: RiskTier, prior_payee_reports: u32) -> Vec<String> {
    let mut actions: Vec<String> = match tier {
        RiskTier::High | RiskTier::Critical => vec![
            "Block the payee account pending investigation".to_string(),
            "Open a special return (MED) request".to_string(),
            "Notify the competent authorities".to_string(),
        ],
        RiskTier::Medium => vec![
            "Monitor the payee account for further transactions".to_string(),
            "Request additional documentation from the payer".to_string(),
        ],
        RiskTier::Low => vec![
            "Keep the report under observation".to_string(),
            "Cross-check consistency against related reports".to_string(),
        ],
    };

    if prior_payee_reports > 3 {
        actions.push("Payee account shows a pattern of repeated reports".to_string());
    }

    actions
}

/// Reduced evaluator for the delegation failure path.
///
/// Applies only the prior-report and account-score rules, with confidence
/// fixed at [`FALLBACK_CONFIDENCE`] and provenance `fallback`.
pub(crate) fn fallback_result(report: &FraudReport, now: DateTime<Utc>) -> ScoreResult {
    let mut score = 0;
    let mut red_flags = Vec::new();

    if report.metadata.prior_payee_reports > 0 {
        score += POINTS_PRIOR_REPORTS;
        red_flags.push("payee named in prior fraud reports".to_string());
    }
    if report.payee.account.risk_score < LOW_ACCOUNT_SCORE {
        score += POINTS_LOW_ACCOUNT_SCORE;
        red_flags.push(format!(
            "payee account risk score is below {LOW_ACCOUNT_SCORE}"
        ));
    }

    let risk_tier = RiskTier::from_score(score);
    ScoreResult {
        score,
        risk_tier,
        red_flags,
        recommendations: recommendations(risk_tier, report.metadata.prior_payee_reports),
        justification: "Deterministic rule evaluation applied because the language-model backend \
                        was unavailable or returned an unusable response."
            .to_string(),
        confidence: FALLBACK_CONFIDENCE,
        source: ScoreSource::Fallback,
        model: FALLBACK_MODEL.to_string(),
        analyzed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::domain::{
        AnalysisMetadata, DeviceContext, EvidenceAttachment, FraudAssessment, FraudReport,
        InitiationChannel, Payee, PayeeAccount, Payer, RecordId, ReportId, ReportStatus,
        RiskProfile, Transaction,
    };
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    fn neutral_report(now: DateTime<Utc>) -> FraudReport {
        FraudReport {
            record_id: RecordId("rel-000001".to_string()),
            report_id: ReportId("REP-0001".to_string()),
            reported_at: now,
            status: ReportStatus::UnderReview,
            last_score: None,
            transaction: Transaction {
                end_to_end_id: "E12345678202401010000000000000001".to_string(),
                tx_id: "TXN0001".to_string(),
                amount: 150.0,
                occurred_at: now - Duration::hours(2),
                initiation: InitiationChannel::QrCode,
            },
            payer: Payer {
                tax_id: "12345678901".to_string(),
                name: "João Silva".to_string(),
                branch: "1234".to_string(),
                account_number: "567890".to_string(),
                institution: "Banco Azul".to_string(),
                risk_profile: RiskProfile::Low,
            },
            payee: Payee {
                tax_id: "98765432100".to_string(),
                name: "Maria Costa".to_string(),
                pix_key: "maria@example.com".to_string(),
                institution: "Banco Verde".to_string(),
                account: PayeeAccount {
                    branch: "0001".to_string(),
                    number: "12345678".to_string(),
                    opened_at: now - Duration::days(400),
                    risk_score: 850,
                },
            },
            assessment: FraudAssessment {
                reason: "Unauthorized transfer".to_string(),
                scam_subtype: "Card cloning".to_string(),
                narrative: "I did not make this transfer.".to_string(),
                evidence: vec![EvidenceAttachment {
                    kind: "screenshot".to_string(),
                    url: "https://example.com/evidence.jpg".to_string(),
                }],
            },
            metadata: AnalysisMetadata {
                prior_payee_reports: 0,
                payee_average_amount: 200.0,
                payer_history_consistent: true,
                device: DeviceContext {
                    device_id: "DEV123".to_string(),
                    ip_address: "192.168.1.100".to_string(),
                    new_device: false,
                },
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn neutral_report_scores_zero_and_low() {
        let now = fixed_now();
        let breakdown = evaluate(&neutral_report(now), now);

        assert_eq!(breakdown.total, 0);
        assert!(breakdown.hits.is_empty());
        assert_eq!(RiskTier::from_score(breakdown.total), RiskTier::Low);
    }

    #[test]
    fn single_keyword_scores_five_points() {
        let now = fixed_now();
        let mut report = neutral_report(now);
        report.assessment.narrative = "Falaram que era urgente transferir.".to_string();

        let breakdown = evaluate(&report, now);

        assert_eq!(breakdown.total, 5);
        assert_eq!(RiskTier::from_score(breakdown.total), RiskTier::Low);
    }

    #[test]
    fn keyword_matching_is_case_insensitive_and_counts_terms_once() {
        let now = fixed_now();
        let mut report = neutral_report(now);
        report.assessment.narrative =
            "URGENTE urgente: pediram minha senha e o token de novo, senha!".to_string();

        let keywords = matched_keywords(&report.assessment.narrative);

        assert_eq!(keywords, vec!["urgente", "senha", "token"]);
        assert_eq!(evaluate(&report, now).total, 15);
    }

    #[test]
    fn critical_scenario_reaches_220_points() {
        let now = fixed_now();
        let mut report = neutral_report(now);
        report.metadata.prior_payee_reports = 8;
        report.metadata.payee_average_amount = 35_000.0;
        report.transaction.amount = 50_000.0;
        report.payee.account.risk_score = 15;
        report.payee.account.opened_at = now - Duration::hours(6);
        report.metadata.payer_history_consistent = false;
        report.metadata.device.new_device = true;
        report.payer.risk_profile = RiskProfile::High;

        let breakdown = evaluate(&report, now);

        assert_eq!(breakdown.total, 220);
        assert_eq!(RiskTier::from_score(breakdown.total), RiskTier::Critical);
        assert!(!breakdown
            .hits
            .iter()
            .any(|hit| hit.signal == RiskSignal::AmountDeviation));
    }

    #[test]
    fn score_is_monotonic_in_prior_reports_and_device_and_age() {
        let now = fixed_now();
        let base = neutral_report(now);
        let base_total = evaluate(&base, now).total;

        let mut one_prior = base.clone();
        one_prior.metadata.prior_payee_reports = 1;
        let mut many_prior = base.clone();
        many_prior.metadata.prior_payee_reports = 5;
        assert!(evaluate(&one_prior, now).total >= base_total);
        assert!(evaluate(&many_prior, now).total >= evaluate(&one_prior, now).total);

        let mut new_device = base.clone();
        new_device.metadata.device.new_device = true;
        assert!(evaluate(&new_device, now).total >= base_total);

        let mut young = base.clone();
        young.payee.account.opened_at = now - Duration::days(20);
        let mut brand_new = base.clone();
        brand_new.payee.account.opened_at = now - Duration::days(2);
        assert!(evaluate(&young, now).total >= base_total);
        assert!(evaluate(&brand_new, now).total >= evaluate(&young, now).total);
    }

    #[test]
    fn account_age_floors_toward_negative_infinity() {
        let now = fixed_now();
        assert_eq!(account_age_days(now - Duration::hours(36), now), 1);
        assert_eq!(account_age_days(now + Duration::hours(12), now), -1);
    }

    #[test]
    fn tier_boundaries_sit_exactly_at_30_70_and_100() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(30), RiskTier::Low);
        assert_eq!(RiskTier::from_score(31), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(70), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(71), RiskTier::High);
        assert_eq!(RiskTier::from_score(100), RiskTier::High);
        assert_eq!(RiskTier::from_score(101), RiskTier::Critical);
    }

    #[test]
    fn account_score_bands_do_not_stack() {
        let now = fixed_now();
        let mut mid = neutral_report(now);
        mid.payee.account.risk_score = 450;
        assert_eq!(evaluate(&mid, now).total, POINTS_MID_ACCOUNT_SCORE);

        let mut low = neutral_report(now);
        low.payee.account.risk_score = 120;
        assert_eq!(evaluate(&low, now).total, POINTS_LOW_ACCOUNT_SCORE);
    }

    #[test]
    fn fallback_applies_two_rules_with_fixed_confidence() {
        let now = fixed_now();
        let mut report = neutral_report(now);
        report.metadata.prior_payee_reports = 2;
        report.payee.account.risk_score = 100;

        let result = fallback_result(&report, now);

        assert_eq!(result.score, 60);
        assert_eq!(result.risk_tier, RiskTier::Medium);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(result.source, ScoreSource::Fallback);
        assert_eq!(result.red_flags.len(), 2);
    }

    #[test]
    fn fallback_ignores_rules_outside_its_subset() {
        let now = fixed_now();
        let mut report = neutral_report(now);
        report.metadata.device.new_device = true;
        report.metadata.payer_history_consistent = false;
        report.assessment.narrative = "urgente senha token".to_string();

        let result = fallback_result(&report, now);

        assert_eq!(result.score, 0);
        assert_eq!(result.risk_tier, RiskTier::Low);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn repeat_target_recommendation_is_appended_regardless_of_tier() {
        let low_tier = recommendations(RiskTier::Low, 4);
        assert!(low_tier
            .iter()
            .any(|action| action.contains("repeated reports")));

        let critical = recommendations(RiskTier::Critical, 0);
        assert!(critical.iter().any(|action| action.contains("MED")));
        assert!(!critical
            .iter()
            .any(|action| action.contains("repeated reports")));
    }
}
