//! Session state and the user actions that drive it.
//!
//! A [`Session`] moves through `AwaitingApiKey -> AwaitingUpload -> Ready`.
//! Actions never return errors: failures are reported through the [`View`]
//! and the action yields `None`.

use bytes::Bytes;
use std::fmt;
use std::path::Path;

use crate::error::PdfQaError;
use crate::llm::{groq_client, LlmConfig, SharedLlmClient};
use crate::model::DocumentText;
use crate::pdf::{extract_text, PageExtractor, PdfExtractPages};

/// Builds a completion client from an API key.
pub type ClientFactory = Box<dyn Fn(&str) -> SharedLlmClient + Send + Sync>;

/// The content tabs a session renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Summary,
    Answer,
    OriginalText,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Summary, Tab::Answer, Tab::OriginalText];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Summary => "Summary",
            Tab::Answer => "Q&A",
            Tab::OriginalText => "Original Text",
        }
    }
}

/// Where session notices and panel content are shown.
pub trait View {
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn render(&mut self, tab: Tab, content: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingApiKey,
    AwaitingUpload,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::AwaitingApiKey => "awaiting API key",
            SessionState::AwaitingUpload => "awaiting PDF upload",
            SessionState::Ready => "ready",
        };
        f.write_str(s)
    }
}

/// The name an uploaded file is known by: its file name, not the full path.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string()
}

pub const MISSING_KEY_WARNING: &str = "Please enter your Groq API key to continue.";
pub const MISSING_DOCUMENT_WARNING: &str = "Please upload a PDF file first.";
pub const MISSING_QUESTION_WARNING: &str = "Please enter a question about the document.";

pub struct Session {
    extractor: Box<dyn PageExtractor>,
    client_factory: ClientFactory,
    client: Option<SharedLlmClient>,
    document: Option<DocumentText>,
    question: Option<String>,
    summary: Option<String>,
    answer: Option<String>,
}

impl Session {
    /// Create a session that builds clients with `client_factory` and reads
    /// PDFs with `pdf_extract`.
    pub fn new(client_factory: ClientFactory) -> Self {
        Self {
            extractor: Box::new(PdfExtractPages),
            client_factory,
            client: None,
            document: None,
            question: None,
            summary: None,
            answer: None,
        }
    }

    /// Create a session talking to Groq with `config`.
    pub fn groq(config: LlmConfig) -> Self {
        Self::new(Box::new(move |key: &str| groq_client(key, config.clone())))
    }

    /// Replace the PDF backend.
    pub fn with_extractor(mut self, extractor: Box<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn state(&self) -> SessionState {
        match (&self.client, &self.document) {
            (None, _) => SessionState::AwaitingApiKey,
            (Some(_), None) => SessionState::AwaitingUpload,
            (Some(_), Some(_)) => SessionState::Ready,
        }
    }

    pub fn document(&self) -> Option<&DocumentText> {
        self.document.as_ref()
    }

    pub fn original_text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.as_str())
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// Enter an API key. A blank key leaves the session waiting for one.
    pub fn set_api_key(&mut self, key: &str, view: &mut dyn View) -> SessionState {
        let key = key.trim();
        if key.is_empty() {
            self.client = None;
            view.warning(MISSING_KEY_WARNING);
            return self.state();
        }

        self.client = Some((self.client_factory)(key));
        tracing::debug!(state = %self.state(), "API key set");
        self.state()
    }

    /// Upload a PDF and extract its text, replacing any previous document.
    pub fn upload(&mut self, name: &str, data: Bytes, view: &mut dyn View) -> SessionState {
        if self.client.is_none() {
            view.warning(MISSING_KEY_WARNING);
            return self.state();
        }

        self.clear_document();

        match extract_text(self.extractor.as_ref(), name, &data) {
            Ok(document) => {
                self.document = Some(document);
                view.success("PDF processed successfully!");
            }
            Err(e) => {
                tracing::warn!(source = name, error = %e, "PDF extraction failed");
                view.error(&format!("Error processing PDF: {}", e.detail()));
            }
        }
        self.state()
    }

    /// Read `path` from disk and upload it.
    pub fn upload_path(&mut self, path: &Path, view: &mut dyn View) -> SessionState {
        if self.client.is_none() {
            view.warning(MISSING_KEY_WARNING);
            return self.state();
        }

        let name = source_name(path);

        match std::fs::read(path).map_err(PdfQaError::from) {
            Ok(data) => self.upload(&name, Bytes::from(data), view),
            Err(e) => {
                self.clear_document();
                view.error(&format!("Error processing PDF: {}", e.detail()));
                self.state()
            }
        }
    }

    /// Generate a summary of the current document.
    pub async fn summarize(&mut self, view: &mut dyn View) -> Option<String> {
        let (client, document) = self.ready_parts(view)?;

        self.summary = None;
        match client.summarize(document.text.clone()).await {
            Ok(summary) => {
                view.render(Tab::Summary, &summary);
                self.summary = Some(summary.clone());
                Some(summary)
            }
            Err(e) => {
                view.error(&format!("Error generating summary: {}", e.detail()));
                None
            }
        }
    }

    /// Answer `question` about the current document.
    pub async fn answer(&mut self, question: &str, view: &mut dyn View) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            view.warning(MISSING_QUESTION_WARNING);
            return None;
        }
        let (client, document) = self.ready_parts(view)?;

        self.question = Some(question.to_string());
        self.answer = None;
        match client.answer(document.text.clone(), question).await {
            Ok(answer) => {
                view.render(Tab::Answer, &answer);
                self.answer = Some(answer.clone());
                Some(answer)
            }
            Err(e) => {
                view.error(&format!("Error generating answer: {}", e.detail()));
                None
            }
        }
    }

    /// Show the extracted text.
    pub fn show_original_text(&self, view: &mut dyn View) -> bool {
        match &self.document {
            Some(document) => {
                view.render(Tab::OriginalText, document.as_str());
                true
            }
            None => {
                view.warning(MISSING_DOCUMENT_WARNING);
                false
            }
        }
    }

    /// Drop the current document and results, keeping the API key.
    pub fn reset(&mut self) -> SessionState {
        self.clear_document();
        self.state()
    }

    fn clear_document(&mut self) {
        self.document = None;
        self.question = None;
        self.summary = None;
        self.answer = None;
    }

    /// Client and document for a completion, or a warning when not ready.
    fn ready_parts(&self, view: &mut dyn View) -> Option<(SharedLlmClient, DocumentText)> {
        match (&self.client, &self.document) {
            (None, _) => {
                view.warning(MISSING_KEY_WARNING);
                None
            }
            (Some(_), None) => {
                view.warning(MISSING_DOCUMENT_WARNING);
                None
            }
            (Some(client), Some(document)) => Some((client.clone(), document.clone())),
        }
    }
}
