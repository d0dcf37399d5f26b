use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::reports::domain::{
    AnalysisMetadata, DeviceContext, EvidenceAttachment, FraudAssessment, FraudReport,
    InitiationChannel, Payee, PayeeAccount, Payer, RecordId, ReportId, ReportSubmission,
    RiskProfile, Transaction,
};
use crate::reports::repository::{
    AnalysisRecord, AnalysisStore, ReportPage, ReportPatch, ReportQuery, ReportRepository,
    RepositoryError,
};
use crate::reports::service::ReportService;
use crate::scoring::{
    LlmTransport, PlaceholderPolicy, PromptLibrary, ScoreResult, ScoreSource, ScoringEngine,
    TransportError,
};

pub(super) fn prompt_library() -> PromptLibrary {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../prompts");
    PromptLibrary::new(dir, PlaceholderPolicy::Lenient)
}

pub(super) fn submission(report_id: &str) -> ReportSubmission {
    let now = Utc::now();
    ReportSubmission {
        report_id: ReportId(report_id.to_string()),
        reported_at: now,
        transaction: Transaction {
            end_to_end_id: format!("E-{report_id}"),
            tx_id: format!("TXN-{report_id}"),
            amount: 150.0,
            occurred_at: now - Duration::hours(2),
            initiation: InitiationChannel::QrCode,
        },
        payer: Payer {
            tax_id: "12345678901".to_string(),
            name: "João Silva Santos".to_string(),
            branch: "1234".to_string(),
            account_number: "567890".to_string(),
            institution: "Banco Azul".to_string(),
            risk_profile: RiskProfile::Low,
        },
        payee: Payee {
            tax_id: "98765432100".to_string(),
            name: "Maria Oliveira Costa".to_string(),
            pix_key: "maria.oliveira@example.com".to_string(),
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
            narrative: "I received a PIX notification for a transfer I never made.".to_string(),
            evidence: vec![EvidenceAttachment {
                kind: "screenshot".to_string(),
                url: "https://example.com/evidence1.jpg".to_string(),
            }],
        },
        metadata: AnalysisMetadata {
            prior_payee_reports: 0,
            payee_average_amount: 200.0,
            payer_history_consistent: true,
            device: DeviceContext {
                device_id: "DEV123456789".to_string(),
                ip_address: "192.168.1.100".to_string(),
                new_device: false,
            },
        },
    }
}

pub(super) fn risky_submission(report_id: &str) -> ReportSubmission {
    let now = Utc::now();
    let mut risky = submission(report_id);
    risky.metadata.prior_payee_reports = 8;
    risky.metadata.payee_average_amount = 35_000.0;
    risky.metadata.payer_history_consistent = false;
    risky.metadata.device.new_device = true;
    risky.transaction.amount = 50_000.0;
    risky.payee.account.opened_at = now - Duration::hours(6);
    risky.payee.account.risk_score = 15;
    risky.payer.risk_profile = RiskProfile::High;
    risky.assessment.narrative =
        "Disseram que era urgente e pediram minha senha e o token.".to_string();
    risky
}

#[derive(Default)]
pub(super) struct TestRepository {
    records: Mutex<HashMap<RecordId, FraudReport>>,
}

impl ReportRepository for TestRepository {
    fn insert(&self, report: FraudReport) -> Result<FraudReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.contains_key(&report.record_id)
            || guard
                .values()
                .any(|existing| existing.report_id == report.report_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(report.record_id.clone(), report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<FraudReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_report_id(&self, id: &ReportId) -> Result<Option<FraudReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|report| &report.report_id == id).cloned())
    }

    fn update(&self, id: &RecordId, patch: ReportPatch) -> Result<FraudReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let report = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if let Some(status) = patch.status {
            report.status = status;
        }
        if let Some(score) = patch.score {
            report.last_score = Some(score);
        }
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    fn list(&self, query: &ReportQuery) -> Result<ReportPage, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut reports: Vec<FraudReport> = guard
            .values()
            .filter(|report| query.status.map_or(true, |status| report.status == status))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = reports.len();
        let total_pages = total.div_ceil(query.limit);
        let reports = reports
            .into_iter()
            .skip((query.page - 1) * query.limit)
            .take(query.limit)
            .collect();

        Ok(ReportPage {
            reports,
            total_pages,
            current_page: query.page,
            total,
        })
    }

    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct TestStore {
    records: Mutex<Vec<AnalysisRecord>>,
    seq: AtomicU64,
    pub(super) fail_appends: bool,
}

impl TestStore {
    pub(super) fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub(super) fn appended(&self) -> Vec<AnalysisRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl AnalysisStore for TestStore {
    fn append(
        &self,
        report: &RecordId,
        result: ScoreResult,
    ) -> Result<AnalysisRecord, RepositoryError> {
        if self.fail_appends {
            return Err(RepositoryError::Unavailable("store offline".to_string()));
        }
        let record = AnalysisRecord {
            report_record_id: report.clone(),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            result,
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn latest_for(&self, report: &RecordId) -> Result<Option<AnalysisRecord>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.report_record_id == report)
            .max_by_key(|record| (record.result.analyzed_at, record.seq))
            .cloned())
    }

    fn purge_for(&self, report: &RecordId) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.report_record_id != report);
        Ok(before - guard.len())
    }
}

pub(super) struct FailingTransport;

#[async_trait]
impl LlmTransport for FailingTransport {
    async fn invoke(&self, _prompt: &str) -> Result<String, TransportError> {
        Err(TransportError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Gemini
    }

    fn model(&self) -> &str {
        "gemini-test"
    }
}

pub(super) fn service_with(
    transport: Option<Arc<dyn LlmTransport>>,
    store: Arc<TestStore>,
) -> ReportService<TestRepository, TestStore> {
    let engine = ScoringEngine::new(prompt_library(), transport, store.clone());
    ReportService::new(Arc::new(TestRepository::default()), store, engine)
}
