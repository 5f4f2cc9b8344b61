use pdfqa::llm::LlmConfig;
use pdfqa::{
    groq_client, CompletionRequest, LlmClient, LlmWrapper, MockLlmClient, PdfQaError, Task,
};
use rig::client::CompletionClient;
use rig::providers::groq;
use std::env;
use std::sync::Arc;

fn text(s: &str) -> Arc<str> {
    Arc::from(s)
}

// ============================================================================
// Request Building Tests
// ============================================================================

#[tokio::test]
async fn test_summarize_sends_one_summary_request() {
    let llm = MockLlmClient::new().with_text_response("- Alice meets Bob");

    let result = llm.summarize(text("Alice.Bob.")).await;
    assert_eq!(result.unwrap(), "- Alice meets Bob");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.task(), &Task::Summarize);
    assert_eq!(request.source(), "Alice.Bob.");
    assert!(request.prompt().contains("Alice.Bob."));
    assert!(request.prompt().contains("bullet points"));
    assert_eq!(request.params().max_tokens, 2048);
    assert_eq!(request.params().temperature, 0.3);
}

#[tokio::test]
async fn test_answer_sends_question_with_smaller_budget() {
    let llm = MockLlmClient::new().with_text_response("Bob.");

    let result = llm.answer(text("Alice met Bob."), "  Who did Alice meet? ").await;
    assert_eq!(result.unwrap(), "Bob.");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.task(),
        &Task::Answer {
            question: "Who did Alice meet?".to_string()
        }
    );
    let prompt = request.prompt();
    assert!(prompt.contains("Text: Alice met Bob."));
    assert!(prompt.contains("Question: Who did Alice meet?"));
    assert!(prompt.contains("based solely on the information provided in the text"));
    assert_eq!(request.params().max_tokens, 1024);
}

#[tokio::test]
async fn test_custom_config_flows_into_requests() {
    let config = LlmConfig::new()
        .with_model("llama-3.3-70b-versatile")
        .with_temperature(0.0)
        .with_summary_max_tokens(512);
    let llm = MockLlmClient::new().with_config(config);

    llm.summarize(text("Some text.")).await.unwrap();

    let params = llm.requests()[0].params().clone();
    assert_eq!(params.model, "llama-3.3-70b-versatile");
    assert_eq!(params.temperature, 0.0);
    assert_eq!(params.max_tokens, 512);
}

#[test]
fn test_task_and_params_serialize_for_reports() {
    let task = Task::Answer {
        question: "Who?".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&task).unwrap(),
        serde_json::json!({ "kind": "answer", "question": "Who?" })
    );
    assert_eq!(
        serde_json::to_value(Task::Summarize).unwrap(),
        serde_json::json!({ "kind": "summarize" })
    );

    let params = LlmConfig::default().params_for(&task);
    assert_eq!(
        serde_json::to_value(&params).unwrap(),
        serde_json::json!({ "model": "mixtral-8x7b-32768", "temperature": 0.3, "max_tokens": 1024 })
    );
}

// ============================================================================
// Invariant Tests
// ============================================================================

#[tokio::test]
async fn test_empty_question_is_never_sent() {
    let llm = MockLlmClient::new();

    let result = llm.answer(text("Alice.Bob."), "   ").await;
    assert!(matches!(result, Err(PdfQaError::InvalidRequest(_))));
    assert_eq!(llm.request_count(), 0);
}

#[tokio::test]
async fn test_empty_text_is_never_sent() {
    let llm = MockLlmClient::new();

    assert!(llm.summarize(text("")).await.is_err());
    assert!(llm.answer(text(" \n "), "What?").await.is_err());
    assert_eq!(llm.request_count(), 0);
}

#[tokio::test]
async fn test_failures_are_reported_as_completion_errors() {
    let llm = MockLlmClient::new().with_failure("401 Unauthorized: invalid API key");

    match llm.summarize(text("Alice.Bob.")).await {
        Err(PdfQaError::Completion(msg)) => assert!(msg.contains("invalid API key")),
        other => panic!("Expected completion error, got {:?}", other),
    }
    assert_eq!(llm.request_count(), 1);
}

// ============================================================================
// Groq Client Tests (offline)
// ============================================================================

#[test]
fn test_groq_request_carries_configured_parameters() {
    let config = LlmConfig::default().with_temperature(0.7).with_answer_max_tokens(256);
    let client = groq::Client::builder("gsk_test").build();
    let llm = LlmWrapper::with_config(client.completion_model(&config.model), config.clone());

    let task = Task::Answer {
        question: "Who?".to_string(),
    };
    let request =
        CompletionRequest::answer(text("Alice met Bob."), "Who?", config.params_for(&task)).unwrap();
    let sent = llm.rig_request(&request);
    assert_eq!(sent.temperature, Some(0.7));
    assert_eq!(sent.max_tokens, Some(256));
    assert_eq!(sent.chat_history.len(), 1);

    let summary =
        CompletionRequest::summarize(text("Alice met Bob."), config.params_for(&Task::Summarize))
            .unwrap();
    assert_eq!(llm.rig_request(&summary).max_tokens, Some(2048));
}

#[tokio::test]
async fn test_unreachable_api_is_a_completion_error() {
    // nothing listens on port 1
    let client = groq::Client::builder("gsk_test")
        .base_url("http://127.0.0.1:1")
        .build();
    let config = LlmConfig::default();
    let llm = LlmWrapper::with_config(client.completion_model(&config.model), config);

    match llm.summarize(text("Alice.Bob.")).await {
        Err(PdfQaError::Completion(msg)) => assert!(!msg.is_empty()),
        other => panic!("Expected completion error, got {:?}", other),
    }
}

// ============================================================================
// Live API Test
// ============================================================================

#[tokio::test]
async fn test_groq_integration() {
    let _ = dotenvy::dotenv();

    let api_key = match env::var("GROQ_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            println!("Skipping LLM test: Missing GROQ_API_KEY");
            return;
        }
    };

    let mut config = LlmConfig::default().with_answer_max_tokens(64);
    if let Ok(model) = env::var("PDFQA_MODEL") {
        config = config.with_model(model);
    }
    println!("Running LLM test with model: {}", config.model);

    let llm = groq_client(&api_key, config);
    let result = llm
        .answer(
            text("The meeting is scheduled for Tuesday at noon."),
            "On which day is the meeting?",
        )
        .await;

    match result {
        Ok(answer) => {
            println!("✓ LLM Answer: {}", answer);
            assert!(answer.contains("Tuesday"), "Answer should mention Tuesday");
        }
        Err(e) => panic!("LLM test failed: {}", e),
    }
}
