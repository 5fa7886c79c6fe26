//! Advisory text for a case: timeline summaries and strategy suggestions.
//!
//! The model behind [`AdvisoryModel`] is an external, fallible service. The
//! [`Advisor`] is the boundary: it always hands back display text, and any
//! failure becomes a fixed fallback message. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AdvisoryConfig;
use crate::error::AdvisoryError;
use crate::legal::case::{CaseRecord, TimelineEvent};

pub const EMPTY_TIMELINE_MESSAGE: &str = "No hay eventos en el evolutivo para analizar.";
pub const SUMMARY_FALLBACK: &str = "Error al generar el resumen de la IA.";
pub const STRATEGY_FALLBACK: &str =
    "No se pudo obtener una sugerencia estratégica en este momento.";

const SUMMARY_INSTRUCTION: &str =
    "Eres un asistente experto para abogados en España. Tu tono es profesional, conciso y técnico.";
const STRATEGY_INSTRUCTION: &str = "Eres un consultor legal senior. Analiza la situación y ofrece consejos estratégicos basados en el procedimiento judicial español.";

const SUMMARY_PROMPT: &str = "Analiza el siguiente historial de eventos de un expediente judicial y proporciona un resumen ejecutivo estructurado con los hitos más importantes y el estado actual sugerido:";
const STRATEGY_PROMPT: &str = "Basado en la siguiente información de expediente, sugiere posibles pasos a seguir o precauciones legales:";

/// One generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait AdvisoryModel: Send + Sync {
    async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError>;
}

/// `generateContent` client for Gemini-compatible endpoints.
pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
}

impl GeminiModel {
    pub fn new(endpoint: Url, api_key: SecretString, timeout: Duration) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Build a client from config. Fails with `Disabled` when advisory text
    /// is switched off or no API key is configured.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        if !config.enabled {
            return Err(AdvisoryError::Disabled);
        }
        let api_key = config.api_key.clone().ok_or(AdvisoryError::Disabled)?;
        Self::new(config.endpoint.clone(), api_key, config.timeout)
    }

    fn url_for(&self, model: &str) -> Result<Url, AdvisoryError> {
        self.endpoint
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| AdvisoryError::InvalidEndpoint(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl<'a> GenerateBody<'a> {
    fn from_request(request: &'a AdvisoryRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, AdvisoryError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl AdvisoryModel for GeminiModel {
    async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let url = self.url_for(&request.model)?;
        tracing::debug!(model = %request.model, "Requesting advisory text");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GenerateBody::from_request(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<GenerateResponse>().await?.into_text()
    }
}

/// Turns case data into advisory text through an [`AdvisoryModel`].
#[derive(Clone)]
pub struct Advisor {
    model: Arc<dyn AdvisoryModel>,
    config: AdvisoryConfig,
}

impl Advisor {
    pub fn new(model: Arc<dyn AdvisoryModel>, config: AdvisoryConfig) -> Self {
        Self { model, config }
    }

    /// Executive summary of a case timeline. An empty timeline is answered
    /// locally without calling the model.
    pub async fn summarize_timeline(&self, timeline: &[TimelineEvent]) -> String {
        if timeline.is_empty() {
            return EMPTY_TIMELINE_MESSAGE.to_string();
        }
        let request = match prompt_with_json(SUMMARY_PROMPT, timeline) {
            Ok(prompt) => AdvisoryRequest {
                model: self.config.summary_model.clone(),
                system_instruction: SUMMARY_INSTRUCTION.to_string(),
                prompt,
                temperature: self.config.summary_temperature,
            },
            Err(err) => return fallback("summary", err, SUMMARY_FALLBACK),
        };
        self.run("summary", request, SUMMARY_FALLBACK).await
    }

    /// Suggested next steps for a whole case.
    pub async fn suggest_strategy(&self, case: &CaseRecord) -> String {
        let request = match prompt_with_json(STRATEGY_PROMPT, case) {
            Ok(prompt) => AdvisoryRequest {
                model: self.config.strategy_model.clone(),
                system_instruction: STRATEGY_INSTRUCTION.to_string(),
                prompt,
                temperature: self.config.strategy_temperature,
            },
            Err(err) => return fallback("strategy", err, STRATEGY_FALLBACK),
        };
        self.run("strategy", request, STRATEGY_FALLBACK).await
    }

    async fn run(&self, task: &str, request: AdvisoryRequest, fallback_text: &str) -> String {
        if !self.config.enabled {
            return fallback(task, AdvisoryError::Disabled, fallback_text);
        }

        let timeout = self.config.timeout;
        let result = match tokio::time::timeout(timeout, self.model.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisoryError::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(text) => text,
            Err(err) => fallback(task, err, fallback_text),
        }
    }
}

fn prompt_with_json<T: Serialize + ?Sized>(intro: &str, value: &T) -> Result<String, AdvisoryError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AdvisoryError::Serialization(e.to_string()))?;
    Ok(format!("{intro}\n\n{json}"))
}

fn fallback(task: &str, err: AdvisoryError, text: &str) -> String {
    tracing::warn!(task, error = %err, "Advisory request failed");
    text.to_string()
}
