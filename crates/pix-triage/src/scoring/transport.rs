//! Adapters over the supported generative backends.
//!
//! Each backend has its own request envelope, authentication header, and
//! response envelope, behind a uniform single-shot contract: one request,
//! one response, no retries. Timeouts surface through [`TransportError::Http`]
//! and are treated like any other transport failure by the engine.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ScoreSource;
use crate::config::{LlmConfig, LlmProvider};

const SYSTEM_PREAMBLE: &str =
    "You are a financial fraud analysis specialist. Always answer with valid JSON.";
const TEMPERATURE: f32 = 0.1;
const MAX_OUTPUT_TOKENS: u32 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("llm request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("llm backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response envelope missing {0}")]
    MalformedEnvelope(&'static str),
}

/// Stateless request/response adapter for a generative backend.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, TransportError>;
    fn source(&self) -> ScoreSource;
    fn model(&self) -> &str;
}

/// Build the transport selected by configuration, or `None` when the
/// selected backend has no credential (the engine then runs in mock mode).
pub fn from_config(config: &LlmConfig) -> Option<Arc<dyn LlmTransport>> {
    match config.provider {
        LlmProvider::Gemini => config.gemini.api_key.as_ref().map(|key| {
            Arc::new(GeminiTransport::new(
                config.gemini.base_url.clone(),
                key.clone(),
                config.gemini.model.clone(),
            )) as Arc<dyn LlmTransport>
        }),
        LlmProvider::OpenAi => config.openai.api_key.as_ref().map(|key| {
            Arc::new(OpenAiTransport::new(
                config.openai.base_url.clone(),
                key.clone(),
                config.openai.model.clone(),
            )) as Arc<dyn LlmTransport>
        }),
    }
}

pub struct OpenAiTransport {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatAnswer,
}

#[derive(Deserialize)]
struct ChatAnswer {
    content: Option<String>,
}

impl OpenAiTransport {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmTransport for OpenAiTransport {
    async fn invoke(&self, prompt: &str) -> Result<String, TransportError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PREAMBLE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(TransportError::MalformedEnvelope(
                "choices[0].message.content",
            ))
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }
}

pub struct GeminiTransport {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: [GenerateContent; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerateContent {
    parts: [GeneratePart; 1],
}

#[derive(Serialize)]
struct GeneratePart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiTransport {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmTransport for GeminiTransport {
    async fn invoke(&self, prompt: &str) -> Result<String, TransportError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: [GenerateContent {
                parts: [GeneratePart {
                    text: format!("{SYSTEM_PREAMBLE}\n\n{prompt}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                top_p: 0.8,
                top_k: 10,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GenerateResponse = response.json().await?;
        envelope
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(TransportError::MalformedEnvelope(
                "candidates[0].content.parts[0].text",
            ))
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }
}
