use super::prompt;
use crate::config::BackendConfig;
use crate::error::CompletionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static apology substituted for an assistant reply when the backend call
/// fails. Part of the client contract: chat must always render something.
pub const CHAT_FALLBACK: &str = "I'm sorry, I couldn't reach the local language model. \
     Please make sure the backend is running.";

/// One wire payload item for chat requests: role and content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// The completion backend seam. One formatting operation, one chat operation;
/// a single round trip each, no retries. Retry policy belongs to callers.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Reformat one section's bulleted notes into prose. On failure the error
    /// carries the raw notes as the fallback payload.
    async fn format(
        &self,
        title: &str,
        content: &str,
        citations: &[String],
    ) -> Result<String, CompletionError>;

    /// Answer the latest user turn given the full ordered history. On failure
    /// the error carries [`CHAT_FALLBACK`].
    async fn chat(&self, turns: &[ChatTurn]) -> Result<String, CompletionError>;
}

/// Shared client settings for a local backend: it may be slow, so the request
/// timeout is generous, but a dead backend must not hang callers forever.
pub fn build_backend_client(request_timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(request_timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for an Ollama-style text-generation backend.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client: build_backend_client(config.request_timeout_secs, config.connect_timeout_secs),
        }
    }

    async fn post_generate(&self, prompt: String, fallback: &str) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| CompletionError::transport(error.to_string(), fallback))?;
        if !response.status().is_success() {
            return Err(CompletionError::transport(
                api_error_message(response).await,
                fallback,
            ));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|error| CompletionError::malformed(error.to_string(), fallback))?;
        non_empty(body.response, fallback)
    }

    async fn post_chat(
        &self,
        messages: Vec<ChatTurn>,
        fallback: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        };
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| CompletionError::transport(error.to_string(), fallback))?;
        if !response.status().is_success() {
            return Err(CompletionError::transport(
                api_error_message(response).await,
                fallback,
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|error| CompletionError::malformed(error.to_string(), fallback))?;
        non_empty(body.message.content, fallback)
    }
}

#[async_trait]
impl Completion for OllamaClient {
    async fn format(
        &self,
        title: &str,
        content: &str,
        citations: &[String],
    ) -> Result<String, CompletionError> {
        let prompt = prompt::section_prompt(title, content, citations);
        self.post_generate(prompt, content).await
    }

    async fn chat(&self, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatTurn::new("system", prompt::ASSISTANT_SYSTEM_PROMPT));
        messages.extend_from_slice(turns);
        self.post_chat(messages, CHAT_FALLBACK).await
    }
}

/// A completion that parses but contains no usable text counts as malformed.
fn non_empty(text: String, fallback: &str) -> Result<String, CompletionError> {
    if text.trim().is_empty() {
        Err(CompletionError::malformed("empty completion body", fallback))
    } else {
        Ok(text)
    }
}

async fn api_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read backend error body>".to_string());
    let excerpt: String = body.chars().take(300).collect();
    format!("backend API error ({status}): {excerpt}")
}
