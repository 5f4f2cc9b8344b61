use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfQaError {
    #[error("IO error: {0} - Please check file permissions and path")]
    Io(#[from] io::Error),

    #[error("Extraction error: {0} - The PDF may be malformed, scanned, or use unsupported features")]
    Extraction(String),

    #[error("Completion error: {0} - Please check your API key, network connection and quota")]
    Completion(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl PdfQaError {
    /// The underlying message without the remediation hint, for inline display.
    pub fn detail(&self) -> String {
        match self {
            PdfQaError::Io(err) => err.to_string(),
            PdfQaError::Extraction(msg)
            | PdfQaError::Completion(msg)
            | PdfQaError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

impl From<rig::completion::CompletionError> for PdfQaError {
    fn from(error: rig::completion::CompletionError) -> Self {
        PdfQaError::Completion(error.to_string())
    }
}
