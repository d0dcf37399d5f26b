use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FraudReport, RecordId, ReportId, ReportStatus};
use crate::scoring::ScoreResult;

/// Error enumeration shared by the report and analysis stores.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Fields the service may change on a stored report after a scoring attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportPatch {
    pub status: Option<ReportStatus>,
    pub score: Option<u32>,
}

/// Listing parameters, 1-based page numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub page: usize,
    pub limit: usize,
    pub status: Option<ReportStatus>,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            status: None,
        }
    }
}

/// One page of reports, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage {
    pub reports: Vec<FraudReport>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total: usize,
}

/// Storage abstraction for report records so the service can be exercised in
/// isolation.
pub trait ReportRepository: Send + Sync {
    /// Insert a new report; duplicate external or record identifiers are a
    /// [`RepositoryError::Conflict`].
    fn insert(&self, report: FraudReport) -> Result<FraudReport, RepositoryError>;
    fn fetch(&self, id: &RecordId) -> Result<Option<FraudReport>, RepositoryError>;
    fn fetch_by_report_id(&self, id: &ReportId) -> Result<Option<FraudReport>, RepositoryError>;
    /// Apply a patch to the denormalized triage fields, refreshing
    /// `updated_at`.
    fn update(&self, id: &RecordId, patch: ReportPatch) -> Result<FraudReport, RepositoryError>;
    fn list(&self, query: &ReportQuery) -> Result<ReportPage, RepositoryError>;
    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError>;
}

/// A persisted scoring attempt for a report.
///
/// Append-only: records are never mutated, and are removed only by the
/// administrative bulk purge for a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub report_record_id: RecordId,
    /// Store-assigned insertion sequence, used to break `analyzed_at` ties.
    pub seq: u64,
    #[serde(flatten)]
    pub result: ScoreResult,
    pub created_at: DateTime<Utc>,
}

/// Append-only store of scoring attempts.
///
/// The "most recent" analysis for a report is the one with the greatest
/// `analyzed_at`; ties are broken by the store-assigned insertion sequence
/// (higher wins), never by storage-engine default ordering.
pub trait AnalysisStore: Send + Sync {
    fn append(
        &self,
        report: &RecordId,
        result: ScoreResult,
    ) -> Result<AnalysisRecord, RepositoryError>;
    fn latest_for(&self, report: &RecordId) -> Result<Option<AnalysisRecord>, RepositoryError>;
    /// Delete every analysis for a report, returning how many were removed.
    fn purge_for(&self, report: &RecordId) -> Result<usize, RepositoryError>;
}
