//! Validation of raw generative-backend output into a scoring verdict.

use serde::Deserialize;

use super::RiskTier;

/// Raised when the transport succeeded but the returned text is unusable.
/// Always recovered by falling back to rule evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("response text contains no JSON object")]
    MissingObject,
    #[error("response JSON malformed or missing required fields: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The structured answer extracted from a backend response.
///
/// `score` and `risk_tier` are required; everything else defaults so a
/// terse backend answer still validates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmVerdict {
    pub score: u32,
    #[serde(alias = "riskTier")]
    pub risk_tier: RiskTier,
    #[serde(default, alias = "redFlags")]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub confidence: u8,
}

/// Find the first brace-balanced JSON object in `raw`.
///
/// Generative backends routinely wrap the object in commentary or code
/// fences; this bounded scanner tolerates both, tracking string and escape
/// state so braces inside string values do not unbalance the walk.
pub fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract and deserialize the first JSON object in `raw`, clamping
/// confidence into its documented 0-100 range.
pub fn parse_verdict(raw: &str) -> Result<LlmVerdict, ResponseError> {
    let object = extract_object(raw).ok_or(ResponseError::MissingObject)?;
    let mut verdict: LlmVerdict = serde_json::from_str(object)?;
    verdict.confidence = verdict.confidence.min(100);
    Ok(verdict)
}
