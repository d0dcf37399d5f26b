//! Risk-scoring core for fraud reports.
//!
//! A scoring attempt is a linear pipeline: render the prompt, delegate to
//! the configured backend (or a canned mock response when no credential is
//! configured), validate the answer, and on any delegation failure degrade
//! to deterministic rule evaluation. The attempt finishes with a best-effort
//! append to the analysis store; only a rendering failure is surfaced to the
//! caller.

pub mod prompt;
pub mod response;
pub mod rules;
pub mod transport;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::reports::domain::FraudReport;
use crate::reports::repository::AnalysisStore;

pub use prompt::{PlaceholderPolicy, PromptLibrary, RenderError};
pub use response::{LlmVerdict, ResponseError};
pub use rules::{RiskSignal, RuleBreakdown, SignalHit};
pub use transport::{GeminiTransport, LlmTransport, OpenAiTransport, TransportError};

/// Template consumed by every scoring attempt.
pub const SCORING_TEMPLATE: &str = "fraud_analysis";

const MOCK_MODEL: &str = "mock";

/// Canned response used when no backend credential is configured. A
/// deterministic development stand-in, not a failure path: it flows through
/// the same validation as a real backend answer.
const MOCK_RESPONSE: &str = r#"{
  "score": 85,
  "risk_tier": "HIGH",
  "red_flags": [
    "Payee named in prior fraud reports",
    "Payee account opened recently",
    "Amount significantly above the payee average",
    "Suspicious keywords in the user narrative"
  ],
  "recommendations": [
    "Block the payee account pending investigation",
    "Open a special return (MED) request",
    "Monitor the payee account intensively",
    "Request additional documentation from the payer"
  ],
  "justification": "Assessment based on multiple risk indicators: payee history, account age, transaction amount, and narrative analysis. The elevated score calls for preventive action.",
  "confidence": 85
}"#;

/// Four-tier classification produced by the scoring core.
///
/// Distinct from the three-bucket [`crate::reports::domain::ReportStatus`]
/// vocabulary; the two are never merged. Portuguese aliases keep older
/// backend answers parseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "LOW", alias = "BAIXO")]
    Low,
    #[serde(rename = "MEDIUM", alias = "MEDIO")]
    Medium,
    #[serde(rename = "HIGH", alias = "ALTO")]
    High,
    #[serde(rename = "CRITICAL", alias = "CRITICO")]
    Critical,
}

impl RiskTier {
    /// Canonical four-bucket mapping from total points.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=30 => RiskTier::Low,
            31..=70 => RiskTier::Medium,
            71..=100 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

/// Which computation path produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    OpenAi,
    Gemini,
    Mock,
    Fallback,
}

impl ScoreSource {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreSource::OpenAi => "openai",
            ScoreSource::Gemini => "gemini",
            ScoreSource::Mock => "mock",
            ScoreSource::Fallback => "fallback",
        }
    }
}

/// Outcome of one scoring attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub risk_tier: RiskTier,
    pub red_flags: Vec<String>,
    pub recommendations: Vec<String>,
    pub justification: String,
    pub confidence: u8,
    pub source: ScoreSource,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Drives a scoring attempt end to end.
///
/// Holds no per-attempt state; concurrent attempts for different reports
/// are independent and require no coordination.
pub struct ScoringEngine<S: AnalysisStore> {
    prompts: PromptLibrary,
    transport: Option<Arc<dyn LlmTransport>>,
    store: Arc<S>,
}

impl<S: AnalysisStore> ScoringEngine<S> {
    pub fn new(
        prompts: PromptLibrary,
        transport: Option<Arc<dyn LlmTransport>>,
        store: Arc<S>,
    ) -> Self {
        Self {
            prompts,
            transport,
            store,
        }
    }

    /// Wire the engine from a configuration value built at process start.
    pub fn from_config(config: &LlmConfig, store: Arc<S>) -> Self {
        let prompts = PromptLibrary::new(config.prompt_dir.clone(), config.placeholder_policy);
        Self::new(prompts, transport::from_config(config), store)
    }

    /// Score a report, always returning a result unless the prompt itself
    /// cannot be produced.
    ///
    /// Transport and validation failures are absorbed by the deterministic
    /// fallback evaluator; persistence failures are logged and swallowed so
    /// the caller can still update the report's denormalized fields.
    pub async fn score(&self, report: &FraudReport) -> Result<ScoreResult, RenderError> {
        let now = Utc::now();
        let variables = prompt::scoring_variables(report, now);
        let rendered = self.prompts.load_and_render(SCORING_TEMPLATE, &variables)?;

        let result = match &self.transport {
            None => {
                debug!(
                    report = %report.record_id.0,
                    "no llm credential configured, using canned mock analysis"
                );
                self.interpret(MOCK_RESPONSE, ScoreSource::Mock, MOCK_MODEL, report, now)
            }
            Some(transport) => match transport.invoke(&rendered).await {
                Ok(raw) => {
                    self.interpret(&raw, transport.source(), transport.model(), report, now)
                }
                Err(error) => {
                    warn!(
                        report = %report.record_id.0,
                        %error,
                        "llm transport failed, falling back to rule evaluation"
                    );
                    rules::fallback_result(report, now)
                }
            },
        };

        if let Err(error) = self.store.append(&report.record_id, result.clone()) {
            warn!(
                report = %report.record_id.0,
                %error,
                "failed to persist analysis result"
            );
        }

        Ok(result)
    }

    fn interpret(
        &self,
        raw: &str,
        source: ScoreSource,
        model: &str,
        report: &FraudReport,
        now: DateTime<Utc>,
    ) -> ScoreResult {
        match response::parse_verdict(raw) {
            Ok(verdict) => ScoreResult {
                score: verdict.score,
                risk_tier: verdict.risk_tier,
                red_flags: verdict.red_flags,
                recommendations: verdict.recommendations,
                justification: verdict.justification,
                confidence: verdict.confidence,
                source,
                model: model.to_string(),
                analyzed_at: now,
            },
            Err(error) => {
                warn!(
                    report = %report.record_id.0,
                    %error,
                    "llm response failed validation, falling back to rule evaluation"
                );
                rules::fallback_result(report, now)
            }
        }
    }
}
