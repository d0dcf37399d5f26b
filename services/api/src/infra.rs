use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use pix_triage::reports::{
    AnalysisRecord, AnalysisStore, FraudReport, RecordId, ReportId, ReportPage, ReportPatch,
    ReportQuery, ReportRepository, RepositoryError,
};
use pix_triage::scoring::ScoreResult;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<RecordId, FraudReport>>>,
}

impl ReportRepository for InMemoryReportRepository {
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
        Ok(guard
            .values()
            .find(|report| &report.report_id == id)
            .cloned())
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
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Append-only in-memory analysis store. The insertion sequence provides the
/// documented deterministic tie-break for equal analysis timestamps.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalysisStore {
    records: Arc<Mutex<Vec<AnalysisRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl AnalysisStore for InMemoryAnalysisStore {
    fn append(
        &self,
        report: &RecordId,
        result: ScoreResult,
    ) -> Result<AnalysisRecord, RepositoryError> {
        let record = AnalysisRecord {
            report_record_id: report.clone(),
            seq: self.sequence.fetch_add(1, Ordering::Relaxed),
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
