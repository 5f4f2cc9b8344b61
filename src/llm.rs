//! Completion client used for summaries and question answering.
//!
//! [`LlmWrapper`] works with any model implementing rig-core's
//! `CompletionModel` trait; [`groq_client`] builds one for Groq's hosted API.
//! Every call is a single request/response round trip carrying one user
//! message, a fixed temperature and a task-specific token limit.
//!
//! # Example
//! ```ignore
//! use pdfqa::llm::{groq_client, LlmConfig};
//!
//! let llm = groq_client("gsk_...", LlmConfig::default());
//! let summary = llm.summarize(document.text.clone()).await?;
//! ```

use async_trait::async_trait;
use rig::{
    client::CompletionClient,
    completion::{AssistantContent, CompletionModel},
    providers::groq,
    OneOrMany,
};
use std::sync::{Arc, Mutex};

use crate::error::PdfQaError;
use crate::model::{CompletionRequest, CompletionResult, ModelParams, Task};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// Configuration for the completion calls.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Temperature for LLM responses (0.0 = deterministic, 1.0 = creative)
    pub temperature: f64,
    /// Maximum output tokens for summaries
    pub summary_max_tokens: u64,
    /// Maximum output tokens for answers
    pub answer_max_tokens: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            summary_max_tokens: 2048,
            answer_max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 2.0);
        self
    }

    /// Set maximum output tokens for summaries
    pub fn with_summary_max_tokens(mut self, tokens: u64) -> Self {
        self.summary_max_tokens = tokens.max(1);
        self
    }

    /// Set maximum output tokens for answers
    pub fn with_answer_max_tokens(mut self, tokens: u64) -> Self {
        self.answer_max_tokens = tokens.max(1);
        self
    }

    /// Parameters for a request performing `task`.
    pub fn params_for(&self, task: &Task) -> ModelParams {
        let max_tokens = match task {
            Task::Summarize => self.summary_max_tokens,
            Task::Answer { .. } => self.answer_max_tokens,
        };
        ModelParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens,
        }
    }
}

/// A client able to run completion requests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one request and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult;

    /// Get the current configuration
    fn config(&self) -> &LlmConfig;

    /// Summarize `text` as bullet points.
    async fn summarize(&self, text: Arc<str>) -> CompletionResult {
        let params = self.config().params_for(&Task::Summarize);
        let request = CompletionRequest::summarize(text, params)?;
        self.complete(&request).await
    }

    /// Answer `question` using only `text`.
    async fn answer(&self, text: Arc<str>, question: &str) -> CompletionResult {
        let task = Task::Answer {
            question: question.to_string(),
        };
        let params = self.config().params_for(&task);
        let request = CompletionRequest::answer(text, question, params)?;
        self.complete(&request).await
    }
}

/// LLM client over any rig-core `CompletionModel`.
pub struct LlmWrapper<M: CompletionModel> {
    model: Arc<M>,
    config: LlmConfig,
}

impl<M: CompletionModel> LlmWrapper<M> {
    /// Create a new LLM wrapper with custom configuration
    pub fn with_config(model: M, config: LlmConfig) -> Self {
        Self {
            model: Arc::new(model),
            config,
        }
    }

    /// The rig request sent for `request`: one user message carrying the
    /// prompt, plus the request's temperature and token limit.
    pub fn rig_request(&self, request: &CompletionRequest) -> rig::completion::CompletionRequest {
        let params = request.params();
        self.model
            .completion_request(request.prompt().as_str())
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build()
    }
}

/// Join the text parts of an assistant response.
fn extract_text_from_response(content: &OneOrMany<AssistantContent>) -> String {
    content
        .iter()
        .filter_map(|c| match c {
            AssistantContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The response text, or a failure when the model produced none.
fn response_text(content: &OneOrMany<AssistantContent>) -> CompletionResult {
    let text = extract_text_from_response(content);
    if text.trim().is_empty() {
        return Err(PdfQaError::Completion(
            "model returned no text content".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl<M: CompletionModel + Send + Sync + 'static> LlmClient for LlmWrapper<M> {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        let params = request.params();

        tracing::info!(
            task = %request.task(),
            model = %params.model,
            prompt_chars = request.prompt().len(),
            max_tokens = params.max_tokens,
            "sending completion request"
        );

        let completion = self.rig_request(request);

        let response = self
            .model
            .completion(completion)
            .await
            .map_err(|e| {
                tracing::warn!(task = %request.task(), error = %e, "completion request failed");
                PdfQaError::from(e)
            })?;

        response_text(&response.choice)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

/// A mock LLM client for testing.
///
/// Records every request it receives and answers with a canned response, or
/// with a canned failure when one is set.
pub struct MockLlmClient {
    pub text_response: String,
    failure: Option<String>,
    config: LlmConfig,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            text_response: "A mock text response".to_string(),
            failure: None,
            config: LlmConfig::default(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text_response(mut self, response: impl Into<String>) -> Self {
        self.text_response = response.into();
        self
    }

    /// Fail every request with `message`, as an auth or network error would.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn with_config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.failure {
            Some(message) => Err(PdfQaError::Completion(message.clone())),
            None => Ok(self.text_response.clone()),
        }
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

/// Type alias for a boxed LLM client that can be shared across threads
pub type SharedLlmClient = Arc<dyn LlmClient>;

/// Helper function to create a shared LLM client with custom config
pub fn create_llm_client_with_config<M: CompletionModel + Send + Sync + 'static>(
    model: M,
    config: LlmConfig,
) -> SharedLlmClient {
    Arc::new(LlmWrapper::with_config(model, config))
}

/// Create a client for Groq's hosted API authenticated with `api_key`.
pub fn groq_client(api_key: &str, config: LlmConfig) -> SharedLlmClient {
    let client = groq::Client::builder(api_key).build();
    let model = client.completion_model(&config.model);
    create_llm_client_with_config(model, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(LlmConfig::new().with_temperature(5.0).temperature, 2.0);
        assert_eq!(LlmConfig::new().with_temperature(-1.0).temperature, 0.0);
    }

    #[test]
    fn summaries_get_a_larger_budget_than_answers() {
        let config = LlmConfig::default();
        let summary = config.params_for(&Task::Summarize);
        let answer = config.params_for(&Task::Answer {
            question: "why?".to_string(),
        });
        assert_eq!(summary.max_tokens, 2048);
        assert_eq!(answer.max_tokens, 1024);
        assert_eq!(summary.temperature, answer.temperature);
        assert_eq!(summary.model, DEFAULT_MODEL);
    }

    #[test]
    fn empty_response_is_a_completion_error() {
        let empty = OneOrMany::one(AssistantContent::text(""));
        match response_text(&empty) {
            Err(PdfQaError::Completion(msg)) => assert_eq!(msg, "model returned no text content"),
            other => panic!("expected a completion error, got {:?}", other),
        }

        let blank = OneOrMany::one(AssistantContent::text("  \n "));
        assert!(matches!(response_text(&blank), Err(PdfQaError::Completion(_))));
    }

    #[test]
    fn response_text_joins_text_parts() {
        let parts = OneOrMany::many(vec![
            AssistantContent::text("- first"),
            AssistantContent::text("- second"),
        ])
        .expect("two parts");
        assert_eq!(response_text(&parts).unwrap(), "- first\n- second");
    }

    #[test]
    fn rig_errors_map_to_completion_errors() {
        let err = PdfQaError::from(rig::completion::CompletionError::ProviderError(
            "invalid api key".to_string(),
        ));
        match err {
            PdfQaError::Completion(msg) => assert!(msg.contains("invalid api key")),
            other => panic!("expected a completion error, got {:?}", other),
        }
    }
}
