use newsqa_core::summary::context_block;
use newsqa_core::{RankedResult, Summarizer, SummaryError, TemplateSummarizer};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You are an assistant that answers questions about campus news clearly and objectively.";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Pick the remote summarizer when it can work at all, otherwise the template.
pub fn select_summarizer(config: &LlmConfig) -> Arc<dyn Summarizer> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            tracing::info!(model = %config.model, base_url = %config.base_url, "using chat-completions summarizer");
            Arc::new(ChatCompletionsSummarizer::new(config.clone()))
        }
        _ => {
            tracing::info!("no LLM API key configured, answers use the template");
            Arc::new(TemplateSummarizer)
        }
    }
}

/// OpenAI-compatible `/chat/completions` client (DeepSeek by default).
///
/// Blocking; call it from `spawn_blocking` inside the server. The HTTP client
/// is created on first use so it never lives on an async worker thread.
pub struct ChatCompletionsSummarizer {
    config: LlmConfig,
    client: Mutex<Option<Client>>,
}

impl ChatCompletionsSummarizer {
    pub fn new(config: LlmConfig) -> Self {
        Self { config, client: Mutex::new(None) }
    }

    fn client(&self) -> Result<Client, SummaryError> {
        let mut slot = self.client.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| SummaryError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

pub fn build_prompt(query: &str, results: &[RankedResult]) -> String {
    format!(
        "Based on the following campus news, answer the user's question clearly and objectively.\n\n\
         News found:\n{}\n\n\
         User question: {}\n\n\
         Give a short, informative answer based on the news above. \
         If the news does not contain enough information, say so politely.",
        context_block(results),
        query
    )
}

impl Summarizer for ChatCompletionsSummarizer {
    fn summarize(&self, query: &str, results: &[RankedResult]) -> Result<String, SummaryError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| SummaryError::Unavailable("no API key".into()))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
                .map_err(|_| SummaryError::Unavailable("invalid API key".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let prompt = build_prompt(query, results);
        let body = ChatRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            stream: false,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
        };
        let resp = self
            .client()?
            .post(self.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .map_err(|e| SummaryError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(SummaryError::Request(format!("{status}: {text}")));
        }
        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SummaryError::MalformedResponse("no choices returned".into()))
    }

    fn name(&self) -> &'static str { "chat-completions" }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
