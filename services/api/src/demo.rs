use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use crate::infra::{InMemoryAnalysisStore, InMemoryReportRepository};
use crate::samples;
use pix_triage::error::AppError;
use pix_triage::reports::{FraudReport, RecordId, ReportService, ReportSubmission};
use pix_triage::scoring::{
    rules, PlaceholderPolicy, PromptLibrary, RiskTier, ScoringEngine,
};

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Path to a JSON file containing a report submission
    #[arg(long)]
    pub(crate) report: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only run the simplified assessment, skipping the mock-mode engine
    #[arg(long)]
    pub(crate) quick_only: bool,
    /// Directory holding the prompt templates
    #[arg(long, default_value = "prompts")]
    pub(crate) prompt_dir: PathBuf,
}

/// Score a report payload offline, printing the rule-table breakdown.
pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.report)?;
    let submission: ReportSubmission = serde_json::from_str(&raw)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    let now = Utc::now();
    let report = FraudReport::from_submission(submission, RecordId("rel-local".to_string()), now);
    let breakdown = rules::evaluate(&report, now);
    let tier = RiskTier::from_score(breakdown.total);

    println!("Report {}", report.report_id.0);
    println!("==========================");
    for hit in &breakdown.hits {
        println!("  +{:<3} {}", hit.points, hit.note);
    }
    if breakdown.hits.is_empty() {
        println!("  no risk signals triggered");
    }
    println!("--------------------------");
    println!("Total score: {}", breakdown.total);
    println!("Risk tier:   {}", tier.label());
    println!("Recommended actions:");
    for action in rules::recommendations(tier, report.metadata.prior_payee_reports) {
        println!("  - {action}");
    }

    Ok(())
}

/// Submit the bundled sample reports and walk them through both scoring
/// paths against in-memory infrastructure.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryReportRepository::default());
    let store = Arc::new(InMemoryAnalysisStore::default());
    // No transport: the engine answers with its deterministic mock response.
    let prompts = PromptLibrary::new(args.prompt_dir.clone(), PlaceholderPolicy::Lenient);
    let engine = ScoringEngine::new(prompts, None, store.clone());
    let service = ReportService::new(repository, store, engine);

    for (label, submission) in samples::all() {
        let report = service.submit(submission)?;
        println!("[{label}] registered {} as {}", report.report_id.0, report.record_id.0);

        let assessment = service.quick_assess(&report.record_id)?;
        println!(
            "[{label}] quick assessment: score {} -> {}",
            assessment.score,
            assessment.status.label()
        );
        for action in &assessment.recommendations {
            println!("[{label}]   - {action}");
        }

        if !args.quick_only {
            let result = service.analyze(&report.record_id).await?;
            println!(
                "[{label}] engine analysis ({}/{}): score {} -> {} (confidence {})",
                result.source.label(),
                result.model,
                result.score,
                result.risk_tier.label(),
                result.confidence
            );
        }

        println!();
    }

    Ok(())
}
