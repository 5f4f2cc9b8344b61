use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::PdfQaError;
use crate::prompts;

/// Text extracted from one uploaded PDF.
///
/// Page texts are concatenated in page order with no separator. The value is
/// immutable once built; a new upload replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    /// File name of the upload the text came from
    pub source: String,
    /// Number of pages the extractor reported
    pub page_count: usize,
    /// The concatenated page texts
    pub text: Arc<str>,
}

impl DocumentText {
    pub fn new(source: impl Into<String>, page_count: usize, text: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
            page_count,
            text: text.into(),
        }
    }

    /// Build from per-page texts, concatenating them in order.
    pub fn from_pages(source: impl Into<String>, pages: &[String]) -> Self {
        let text: String = pages.concat();
        Self::new(source, pages.len(), text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whitespace-only text counts as blank, not just the empty string.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// What a completion request asks the model to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    Summarize,
    Answer { question: String },
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Summarize => "summary",
            Task::Answer { .. } => "answer",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed sampling parameters sent with a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u64,
}

/// A single completion request, built fresh for every user action.
///
/// Construction enforces that the source text is non-blank and, for
/// [`Task::Answer`], that the question is non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    task: Task,
    source: Arc<str>,
    params: ModelParams,
}

impl CompletionRequest {
    pub fn summarize(source: Arc<str>, params: ModelParams) -> Result<Self, PdfQaError> {
        Self::new(Task::Summarize, source, params)
    }

    pub fn answer(
        source: Arc<str>,
        question: &str,
        params: ModelParams,
    ) -> Result<Self, PdfQaError> {
        // whitespace-only questions are refused like empty ones
        let question = question.trim();
        if question.is_empty() {
            return Err(PdfQaError::InvalidRequest(
                "question must not be empty".to_string(),
            ));
        }
        Self::new(
            Task::Answer {
                question: question.to_string(),
            },
            source,
            params,
        )
    }

    fn new(task: Task, source: Arc<str>, params: ModelParams) -> Result<Self, PdfQaError> {
        if source.trim().is_empty() {
            return Err(PdfQaError::InvalidRequest(
                "document text must not be empty".to_string(),
            ));
        }
        Ok(Self {
            task,
            source,
            params,
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Render the natural-language prompt for this request.
    pub fn prompt(&self) -> String {
        match &self.task {
            Task::Summarize => prompts::summary_prompt(&self.source),
            Task::Answer { question } => prompts::answer_prompt(&self.source, question),
        }
    }
}

/// Outcome of one completion call: the generated text or the failure.
pub type CompletionResult = Result<String, PdfQaError>;
