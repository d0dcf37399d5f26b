use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally supplied report identifier, unique across the whole system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

/// Internally assigned record identifier for a stored report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// How the disputed transfer was initiated by the payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiationChannel {
    #[serde(rename = "QR_CODE")]
    QrCode,
    #[serde(rename = "CHAVE_PIX")]
    PixKey,
    #[serde(rename = "DADOS_BANCARIOS")]
    BankDetails,
    #[serde(rename = "INICIADOR")]
    PaymentInitiator,
}

/// Institution-assessed risk profile of the payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfile {
    #[serde(rename = "BAIXO")]
    Low,
    #[serde(rename = "MEDIO")]
    Medium,
    #[serde(rename = "ALTO")]
    High,
}

impl RiskProfile {
    pub const fn label(self) -> &'static str {
        match self {
            RiskProfile::Low => "BAIXO",
            RiskProfile::Medium => "MEDIO",
            RiskProfile::High => "ALTO",
        }
    }
}

/// The disputed instant-payment transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub end_to_end_id: String,
    pub tx_id: String,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
    pub initiation: InitiationChannel,
}

/// The party who sent the disputed funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    pub tax_id: String,
    pub name: String,
    pub branch: String,
    pub account_number: String,
    pub institution: String,
    pub risk_profile: RiskProfile,
}

/// Account sub-record for the payee, including the institution's own risk score.
///
/// `risk_score` is unconstrained by this crate; observed values range 0-1000,
/// lower meaning riskier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeAccount {
    pub branch: String,
    pub number: String,
    pub opened_at: DateTime<Utc>,
    pub risk_score: i64,
}

/// The party who received the disputed funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub tax_id: String,
    pub name: String,
    pub pix_key: String,
    pub institution: String,
    pub account: PayeeAccount,
}

/// Evidence attached by the reporting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceAttachment {
    pub kind: String,
    pub url: String,
}

/// The user's claim: why the transfer is believed fraudulent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub reason: String,
    pub scam_subtype: String,
    pub narrative: String,
    pub evidence: Vec<EvidenceAttachment>,
}

/// Device fingerprint captured with the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    pub device_id: String,
    pub ip_address: String,
    pub new_device: bool,
}

/// Pre-computed signals supplied by the ingestion boundary for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub prior_payee_reports: u32,
    pub payee_average_amount: f64,
    pub payer_history_consistent: bool,
    pub device: DeviceContext,
}

/// Lifecycle status of a report, using the three-bucket status vocabulary.
///
/// This is intentionally a different vocabulary from the four-tier
/// [`crate::scoring::RiskTier`] produced by the scoring core; the two are
/// never merged. The service layer owns the mapping from a numeric score
/// into this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "EM_ANALISE")]
    UnderReview,
    #[serde(rename = "ALTO_RISCO")]
    HighRisk,
    #[serde(rename = "MEDIO_RISCO")]
    MediumRisk,
    #[serde(rename = "BAIXO_RISCO")]
    LowRisk,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::UnderReview => "EM_ANALISE",
            ReportStatus::HighRisk => "ALTO_RISCO",
            ReportStatus::MediumRisk => "MEDIO_RISCO",
            ReportStatus::LowRisk => "BAIXO_RISCO",
        }
    }
}

/// Inbound report payload, before the service assigns a record identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub report_id: ReportId,
    pub reported_at: DateTime<Utc>,
    pub transaction: Transaction,
    pub payer: Payer,
    pub payee: Payee,
    pub assessment: FraudAssessment,
    pub metadata: AnalysisMetadata,
}

/// A fully hydrated report record.
///
/// Immutable once created, except for `status`, `last_score`, and
/// `updated_at`, which the service mutates after a scoring attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudReport {
    pub record_id: RecordId,
    pub report_id: ReportId,
    pub reported_at: DateTime<Utc>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_score: Option<u32>,
    pub transaction: Transaction,
    pub payer: Payer,
    pub payee: Payee,
    pub assessment: FraudAssessment,
    pub metadata: AnalysisMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FraudReport {
    /// Hydrate a submission into a stored record with `EM_ANALISE` status.
    pub fn from_submission(
        submission: ReportSubmission,
        record_id: RecordId,
        now: DateTime<Utc>,
    ) -> Self {
        let ReportSubmission {
            report_id,
            reported_at,
            transaction,
            payer,
            payee,
            assessment,
            metadata,
        } = submission;

        Self {
            record_id,
            report_id,
            reported_at,
            status: ReportStatus::UnderReview,
            last_score: None,
            transaction,
            payer,
            payee,
            assessment,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}
