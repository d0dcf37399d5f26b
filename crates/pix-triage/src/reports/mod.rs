//! Report intake, persistence contracts, and the triage service facade.

pub mod assessment;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use assessment::{QuickAssessment, quick_assess, status_for_score};
pub use domain::{
    AnalysisMetadata, DeviceContext, EvidenceAttachment, FraudAssessment, FraudReport,
    InitiationChannel, Payee, PayeeAccount, Payer, RecordId, ReportId, ReportStatus,
    ReportSubmission, RiskProfile, Transaction,
};
pub use repository::{
    AnalysisRecord, AnalysisStore, ReportPage, ReportPatch, ReportQuery, ReportRepository,
    RepositoryError,
};
pub use router::report_router;
pub use service::{ReportService, ReportServiceError};
