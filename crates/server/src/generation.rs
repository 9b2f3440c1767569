//! Generation capability.
//!
//! Maps `(question, context documents)` to an answer string through an
//! external LLM backend. Two backends are supported: an Ollama-style local
//! endpoint and an OpenAI-compatible chat-completions endpoint. Both enforce
//! a request timeout; a timed-out request fails with a generation error, it
//! never hangs the caller.

use async_trait::async_trait;
use ragserve_core::Document;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from the generation backend, reported distinctly from retrieval
/// errors so callers can tell "no context found" apart from "could not
/// generate an answer".
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request timed out")]
    Timeout,
    #[error("generation backend unreachable: {0}")]
    Connect(String),
    #[error("generation backend error: {0}")]
    Upstream(String),
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_connect() {
            GenerationError::Connect(err.to_string())
        } else {
            GenerationError::Upstream(err.to_string())
        }
    }
}

/// External capability mapping `(question, context)` to an answer string.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        contexts: &[Arc<Document>],
    ) -> Result<String, GenerationError>;
}

/// Builds the grounding prompt shared by both backends.
///
/// With an empty context the instruction still asks the model to say when
/// the context does not contain an answer, so a corpus miss produces a
/// "no relevant information" reply instead of a hard error.
fn build_prompt(question: &str, contexts: &[Arc<Document>]) -> String {
    let ctx_block = contexts
        .iter()
        .map(|d| format!("- {}", d.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Based on the following context, please answer the question.\n\
         If the context does not provide an answer, say so.\n\n\
         CONTEXT:\n{ctx_block}\n\nQUESTION:\n{question}"
    )
}

/// Generation parameters shared by both backends.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Generator backed by an Ollama-style `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    config: GenerationConfig,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, config: GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(
        &self,
        question: &str,
        contexts: &[Arc<Document>],
    ) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = json!({
            "model": self.config.model,
            "prompt": build_prompt(question, contexts),
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!("{status}: {body}")));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        Ok(parsed.response.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Generator backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    config: GenerationConfig,
}

impl OpenAiGenerator {
    pub fn new(
        base_url: &str,
        api_key: &str,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            config,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        question: &str,
        contexts: &[Arc<Document>],
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "max_tokens": self.config.max_tokens,
            "messages": [{ "role": "user", "content": build_prompt(question, contexts) }],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!("{status}: {body}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".into()))
    }
}
