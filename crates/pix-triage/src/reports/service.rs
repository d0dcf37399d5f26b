use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::assessment::{self, QuickAssessment};
use super::domain::{FraudReport, RecordId, ReportSubmission};
use super::repository::{
    AnalysisRecord, AnalysisStore, ReportPage, ReportPatch, ReportQuery, ReportRepository,
    RepositoryError,
};
use crate::scoring::{RenderError, ScoreResult, ScoringEngine};

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id() -> RecordId {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RecordId(format!("rel-{id:06}"))
}

/// Service composing the report repository, the analysis store, and the
/// scoring engine.
///
/// This is the ingestion boundary that owns the report's denormalized
/// `status`/`last_score` fields: after any scoring attempt it maps the
/// numeric score through the three-bucket status function, while the
/// four-tier risk tier stays inside the returned [`ScoreResult`].
pub struct ReportService<R, S: AnalysisStore> {
    repository: Arc<R>,
    store: Arc<S>,
    engine: ScoringEngine<S>,
}

impl<R, S> ReportService<R, S>
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    pub fn new(repository: Arc<R>, store: Arc<S>, engine: ScoringEngine<S>) -> Self {
        Self {
            repository,
            store,
            engine,
        }
    }

    /// Register a new report, rejecting duplicate external identifiers.
    pub fn submit(&self, submission: ReportSubmission) -> Result<FraudReport, ReportServiceError> {
        if self
            .repository
            .fetch_by_report_id(&submission.report_id)?
            .is_some()
        {
            return Err(RepositoryError::Conflict.into());
        }

        let report = FraudReport::from_submission(submission, next_record_id(), Utc::now());
        Ok(self.repository.insert(report)?)
    }

    pub fn get(&self, id: &RecordId) -> Result<FraudReport, ReportServiceError> {
        let report = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(report)
    }

    pub fn list(&self, query: &ReportQuery) -> Result<ReportPage, ReportServiceError> {
        Ok(self.repository.list(query)?)
    }

    /// Apply a manual correction to the denormalized triage fields.
    pub fn update(
        &self,
        id: &RecordId,
        patch: ReportPatch,
    ) -> Result<FraudReport, ReportServiceError> {
        Ok(self.repository.update(id, patch)?)
    }

    pub fn delete(&self, id: &RecordId) -> Result<(), ReportServiceError> {
        Ok(self.repository.delete(id)?)
    }

    /// Run a full scoring attempt through the engine and record the outcome
    /// on the report.
    ///
    /// The engine already persisted the result best-effort; only a prompt
    /// rendering failure surfaces as an error.
    pub async fn analyze(&self, id: &RecordId) -> Result<ScoreResult, ReportServiceError> {
        let report = self.get(id)?;
        let result = self.engine.score(&report).await?;

        self.repository.update(
            id,
            ReportPatch {
                status: Some(assessment::status_for_score(result.score)),
                score: Some(result.score),
            },
        )?;

        Ok(result)
    }

    /// Run the simplified metadata-only assessment and record the outcome.
    pub fn quick_assess(&self, id: &RecordId) -> Result<QuickAssessment, ReportServiceError> {
        let report = self.get(id)?;
        let outcome = assessment::quick_assess(&report);

        self.repository.update(
            id,
            ReportPatch {
                status: Some(outcome.status),
                score: Some(outcome.score),
            },
        )?;

        Ok(outcome)
    }

    /// Most recent analysis for an existing report, if any was recorded.
    pub fn latest_analysis(
        &self,
        id: &RecordId,
    ) -> Result<Option<AnalysisRecord>, ReportServiceError> {
        self.get(id)?;
        Ok(self.store.latest_for(id)?)
    }

    /// Administrative purge of every analysis for a report.
    pub fn purge_analyses(&self, id: &RecordId) -> Result<usize, ReportServiceError> {
        self.get(id)?;
        Ok(self.store.purge_for(id)?)
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Scoring(#[from] RenderError),
}
