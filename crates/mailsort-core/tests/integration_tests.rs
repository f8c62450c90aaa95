//! Integration tests for mailsort-core
//!
//! These tests run the real HTTP backends against a local mock
//! chat-completions server and exercise the classify → fallback workflow.

use std::time::Duration;

use mailsort_core::{
    test_utils::{MockChatBehavior, MockChatServer},
    AIClient, AzureOpenAIBackend, ChatSettings, ClassificationMethod, ClassifierConfig, Corpus,
    Department, Email, EmailClassifier, Error, ModelBackend, OpenAICompatibleBackend,
};

fn invoice_email() -> Email {
    Email::new("Faktura za marzec", "Proszę o korektę kwoty na fakturze VAT.")
}

// =============================================================================
// Backend Wire Format Tests
// =============================================================================

#[tokio::test]
async fn test_openai_compatible_request_format() {
    let server = MockChatServer::start("IT").await;
    let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "llama3.2", "sk-test");

    let answer = backend
        .classify_via_model(Some("system text"), "user text")
        .await
        .expect("mock server should answer");
    assert_eq!(answer, "IT");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request.body["model"], "llama3.2");
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][0]["content"], "system text");
    assert_eq!(request.body["messages"][1]["role"], "user");
    assert_eq!(request.body["max_tokens"], 50);
}

#[tokio::test]
async fn test_azure_request_format() {
    let server = MockChatServer::start("Księgowość").await;
    let backend = AzureOpenAIBackend::new(&server.url(), "azure-key", "gpt-4o-mini");

    let answer = backend.classify_via_model(None, "prompt").await.unwrap();
    assert_eq!(answer, "Księgowość");

    let requests = server.requests();
    assert_eq!(
        requests[0].path,
        "/openai/deployments/gpt-4o-mini/chat/completions"
    );
    assert_eq!(requests[0].api_key.as_deref(), Some("azure-key"));
    assert!(requests[0].authorization.is_none());
    assert!(requests[0].body.get("model").is_none());
    assert!(backend.health_check().await);
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockChatServer::start_with(MockChatBehavior::Status(500)).await;
    let backend = OpenAICompatibleBackend::new(&server.url(), "m");

    let err = backend.classify_via_model(None, "x").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_unauthorized_is_transport_error() {
    let server = MockChatServer::start_with(MockChatBehavior::Status(401)).await;
    let backend = AzureOpenAIBackend::new(&server.url(), "wrong", "dep");

    let err = backend.classify_via_model(None, "x").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_malformed_body_is_transport_error() {
    let server = MockChatServer::start_with(MockChatBehavior::Garbage).await;
    let backend = OpenAICompatibleBackend::new(&server.url(), "m");

    let err = backend.classify_via_model(None, "x").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockChatServer::start_with(MockChatBehavior::Slow(
        Duration::from_secs(3),
        "IT".into(),
    ))
    .await;
    let backend = OpenAICompatibleBackend::new(&server.url(), "m").with_settings(ChatSettings {
        timeout: Duration::from_millis(200),
        ..ChatSettings::default()
    });

    let err = backend.classify_via_model(None, "x").await.unwrap_err();
    assert!(err.is_transport());
}

// =============================================================================
// Classifier Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_classifier_uses_model_answer() {
    let server = MockChatServer::start("Obsługa Klienta").await;
    let ai = AIClient::OpenAICompatible(OpenAICompatibleBackend::new(&server.url(), "m"));
    let classifier = EmailClassifier::new(Corpus::embedded().unwrap(), Some(ai));

    let result = classifier.classify(&invoice_email()).await;
    assert_eq!(result.label, Department::CustomerService);
    assert_eq!(result.method, ClassificationMethod::Llm);
    assert!(result.confidence >= 0.85 && result.confidence <= 0.95);

    // Few-shot prompt went out as the user message
    let body = &server.requests()[0].body;
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Przykład 8:"));
    assert!(user.contains("Temat: Faktura za marzec"));
}

#[tokio::test]
async fn test_classifier_falls_back_on_server_error() {
    let server = MockChatServer::start_with(MockChatBehavior::Status(503)).await;
    let ai = AIClient::Azure(AzureOpenAIBackend::new(&server.url(), "key", "dep"));
    let classifier = EmailClassifier::new(Corpus::embedded().unwrap(), Some(ai));

    let result = classifier.classify(&invoice_email()).await;
    assert_eq!(result.label, Department::Accounting);
    assert_eq!(result.method, ClassificationMethod::RuleBased);
}

#[tokio::test]
async fn test_classifier_falls_back_on_timeout() {
    let server = MockChatServer::start_with(MockChatBehavior::Slow(
        Duration::from_secs(3),
        "Sprzedaż".into(),
    ))
    .await;
    let ai = AIClient::OpenAICompatible(OpenAICompatibleBackend::new(&server.url(), "m"));
    let config = ClassifierConfig {
        timeout: Duration::from_millis(200),
        ..ClassifierConfig::default()
    };
    let classifier =
        EmailClassifier::new(Corpus::embedded().unwrap(), Some(ai)).with_config(config);

    let result = classifier.classify(&invoice_email()).await;
    assert_eq!(result.method, ClassificationMethod::RuleBased);
    assert_eq!(result.label, Department::Accounting);
}

#[tokio::test]
async fn test_classifier_falls_back_on_unrecognized_answer() {
    let server = MockChatServer::start("Nie wiem").await;
    let ai = AIClient::OpenAICompatible(OpenAICompatibleBackend::new(&server.url(), "m"));
    let classifier = EmailClassifier::new(Corpus::embedded().unwrap(), Some(ai));

    let result = classifier.classify(&Email::new("Test", "Test")).await;
    assert_eq!(result.label, Department::CustomerService);
    assert_eq!(result.confidence, 0.3);
    assert_eq!(result.method, ClassificationMethod::RuleBased);
}

#[tokio::test]
async fn test_evaluate_through_http_backend() {
    let server = MockChatServer::start("IT").await;
    let ai = AIClient::OpenAICompatible(OpenAICompatibleBackend::new(&server.url(), "m"));
    let classifier = EmailClassifier::new(Corpus::embedded().unwrap(), Some(ai));

    let metrics = classifier.evaluate().await;
    assert_eq!(metrics.total_predictions, 20);
    // Every answer is IT, 5 of 20 labels are IT
    assert_eq!(metrics.accuracy, 0.25);
    assert_eq!(metrics.recall, 0.25);
    assert_eq!(server.requests().len(), 20);
}

// =============================================================================
// Environment Configuration
// =============================================================================

// The only test touching the process environment, so there is no race.
#[test]
fn test_backend_selection_from_env() {
    let vars = [
        "AI_BACKEND",
        "AZURE_OPENAI_ENDPOINT",
        "AZURE_OPENAI_API_KEY",
        "AZURE_OPENAI_API_VERSION",
        "AZURE_OPENAI_DEPLOYMENT",
        "OPENAI_COMPATIBLE_HOST",
        "OPENAI_COMPATIBLE_MODEL",
        "OPENAI_COMPATIBLE_API_KEY",
    ];
    for var in vars {
        std::env::remove_var(var);
    }

    // Default backend is azure, which needs endpoint and key
    assert!(AIClient::from_env().is_none());
    assert!(matches!(
        AIClient::try_from_env(),
        Err(Error::ConfigurationMissing(_))
    ));

    // Empty values count as unset
    std::env::set_var("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");
    std::env::set_var("AZURE_OPENAI_API_KEY", "  ");
    assert!(AIClient::from_env().is_none());

    std::env::set_var("AZURE_OPENAI_API_KEY", "key");
    let client = AIClient::from_env().expect("azure should be configured");
    assert_eq!(client.backend_name(), "azure");
    assert_eq!(client.model(), "gpt-4o-mini");
    match &client {
        AIClient::Azure(b) => assert_eq!(b.api_version(), "2024-08-01-preview"),
        other => panic!("unexpected backend {:?}", other),
    }

    std::env::set_var("AI_BACKEND", "openai_compatible");
    assert!(AIClient::from_env().is_none());
    std::env::set_var("OPENAI_COMPATIBLE_HOST", "http://localhost:8000");
    let client = AIClient::from_env().expect("openai_compatible should be configured");
    assert_eq!(client.backend_name(), "openai_compatible");
    assert_eq!(client.model(), "gpt-4o-mini");

    std::env::set_var("AI_BACKEND", "mock");
    assert_eq!(AIClient::from_env().unwrap().backend_name(), "mock");

    std::env::set_var("AI_BACKEND", "nonsense");
    assert!(AIClient::from_env().is_none());

    for var in vars {
        std::env::remove_var(var);
    }
}
