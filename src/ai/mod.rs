//! # Cliente de IA
//!
//! Resumen de texto libre de reservas mediante una API de completions
//! compatible con OpenAI. Una sola petición por llamada: sin reintentos,
//! sin caché y sin agrupar peticiones concurrentes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

/// Tiempo máximo de una llamada al proveedor
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Fallo en la petición HTTP: {0}")]
    Request(#[from] reqwest::Error),

    #[error("El proveedor de IA respondió {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Respuesta de IA sin contenido")]
    EmptyCompletion,
}

/// Convierte texto libre en la respuesta cruda del modelo
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, language: &str) -> Result<String, AiError>;
}

/// Resultado del parseo de la salida del modelo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SummaryParse {
    Parsed(serde_json::Value),
    Unparsed(String),
}

/// Intenta leer la salida del modelo como JSON
///
/// Acepta la salida envuelta en un bloque de código markdown.
pub fn parse_completion(raw: &str) -> SummaryParse {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => SummaryParse::Parsed(value),
        Err(e) => {
            tracing::debug!(error = %e, "Salida de IA no es JSON");
            SummaryParse::Unparsed(raw.to_string())
        }
    }
}

/// Error de un status no exitoso; el cuerpo queda vacío si no se pudo leer
fn api_error<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> AiError {
    let body = body.unwrap_or_else(|e| {
        tracing::debug!(status, error = %e, "No se pudo leer el cuerpo de error de IA");
        String::new()
    });
    AiError::Api { status, body }
}

fn system_prompt(language: &str) -> String {
    format!(
        "You extract restaurant reservation details from free text. \
         Reply with a single JSON object and nothing else, using the keys \
         customer_name, customer_phone, customer_email, party_size, \
         reservation_date (YYYY-MM-DD), reservation_time (HH:MM), \
         special_requests and summary. Use null for unknown values. \
         Write the summary in {}.",
        language
    )
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Cliente HTTP para `/chat/completions`
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AiError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// `None` cuando no hay clave configurada
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, AiError> {
        match &config.openai_api_key {
            Some(key) => Self::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.openai_model.clone(),
            )
            .map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str, language: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(language),
                },
                ChatMessage {
                    role: "user",
                    content: text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response.text().await));
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_json() {
        let parsed = parse_completion(r#"{"party_size": 4}"#);
        assert_eq!(parsed, SummaryParse::Parsed(json!({"party_size": 4})));
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n{\"customer_name\": \"王小姐\"}\n```";
        assert_eq!(
            parse_completion(raw),
            SummaryParse::Parsed(json!({"customer_name": "王小姐"}))
        );
    }

    #[test]
    fn keeps_raw_text_when_not_json() {
        let raw = "Sorry, I cannot help with that.";
        assert_eq!(parse_completion(raw), SummaryParse::Unparsed(raw.to_string()));
    }

    #[test]
    fn tagged_serialization() {
        let value = serde_json::to_value(SummaryParse::Unparsed("x".to_string())).unwrap();
        assert_eq!(value, json!({"status": "unparsed", "value": "x"}));
    }

    #[test]
    fn api_error_keeps_body_or_falls_back_to_empty() {
        match api_error::<String>(429, Ok("rate limited".to_string())) {
            AiError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected {:?}", other),
        }

        match api_error(502, Err("connection reset")) {
            AiError::Api { status, body } => {
                assert_eq!(status, 502);
                assert!(body.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn no_client_without_key() {
        let config = AppConfig::default();
        assert!(OpenAiSummarizer::from_config(&config).unwrap().is_none());
    }
}
