//! Instructional prompts sent to the completion API.
//!
//! Each prompt embeds the full document text. The wording asks for a
//! bullet-point summary, or for an answer grounded only in the supplied text.

/// Opening instruction of the summary prompt.
pub const SUMMARY_INSTRUCTION: &str = "Please provide a comprehensive summary of the following text. Focus on the main points and key takeaways:";

/// Closing instruction of the summary prompt.
pub const SUMMARY_FORMAT: &str =
    "Provide the summary in bullet points, highlighting the most important information.";

/// Opening instruction of the question-answering prompt.
pub const ANSWER_INSTRUCTION: &str =
    "Based on the following text, please answer the question accurately and concisely.";

/// Closing instruction of the question-answering prompt.
pub const ANSWER_GROUNDING: &str =
    "Please provide a clear and direct answer based solely on the information provided in the text.";

/// Build the summary prompt for `text`.
pub fn summary_prompt(text: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}\n\n{text}\n\n{SUMMARY_FORMAT}")
}

/// Build the question-answering prompt for `question` about `text`.
pub fn answer_prompt(text: &str, question: &str) -> String {
    format!("{ANSWER_INSTRUCTION}\n\nText: {text}\n\nQuestion: {question}\n\n{ANSWER_GROUNDING}")
}
