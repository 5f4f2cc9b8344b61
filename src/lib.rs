pub mod error;
pub mod llm;
pub mod model;
pub mod pdf;
pub mod prompts;
pub mod session;
pub mod ui;

// Re-export key types
pub use error::PdfQaError;
pub use llm::{
    create_llm_client_with_config, groq_client, LlmClient, LlmConfig,
    LlmWrapper, MockLlmClient, SharedLlmClient, DEFAULT_MODEL,
};
pub use model::{CompletionRequest, CompletionResult, DocumentText, ModelParams, Task};
pub use pdf::{extract_pdf, extract_text, PageExtractor, PdfExtractPages};
pub use session::{Session, SessionState, Tab, View};
