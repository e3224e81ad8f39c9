use batch_llm::{
    AzureConfig, AzureOpenAIProvider, BatchOptions, Dispatcher, Error, GenerationConfig,
    GenerationRequest, Generator, GeneratorConfig, GeneratorFactory, RetryPolicy, Transport,
};
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT: &str = "gpt-35-turbo-4k-0613";
const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-35-turbo-4k-0613/chat/completions";

fn azure_config(server: &MockServer) -> AzureConfig {
    AzureConfig::new(server.uri(), "test-api-key", DEPLOYMENT, "gpt-35-turbo")
}

fn dispatcher(server: &MockServer) -> Dispatcher<AzureOpenAIProvider> {
    let provider = AzureOpenAIProvider::new(azure_config(server)).unwrap();
    Dispatcher::new(provider, GenerationConfig::new("gpt-35-turbo"))
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": text }
        }]
    }))
}

fn payload(prompt: &str) -> serde_json::Value {
    json!({
        "model": "gpt-35-turbo",
        "messages": [{ "role": "user", "content": prompt }]
    })
}

fn fast_retry(max_attempts: u32) -> BatchOptions {
    BatchOptions::new().with_retry(
        RetryPolicy::default()
            .with_max_attempts(max_attempts)
            .with_retry_delay(Duration::from_millis(10)),
    )
}

fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn test_request_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("content-type", "application/json"))
        .and(header("api-key", "test-api-key"))
        .and(header("temperature", "0.7"))
        .and(header("max_tokens", "100"))
        .and(body_json(payload("What is the capital of France?")))
        .respond_with(completion("Paris"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AzureOpenAIProvider::new(azure_config(&server)).unwrap();
    let request = GenerationRequest::new("What is the capital of France?", 0.7, 100);
    let text = assert_ok!(provider.complete(&request, Duration::from_secs(5)).await);

    assert_eq!(text, "Paris");
}

#[tokio::test]
async fn test_batch_options_override_config_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("temperature", "0.5"))
        .and(header("max_tokens", "2048"))
        .respond_with(completion("defaults"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("temperature", "0.9"))
        .and(header("max_tokens", "64"))
        .respond_with(completion("overridden"))
        .mount(&server)
        .await;

    let dispatcher = dispatcher(&server);

    let defaults = dispatcher
        .generate_batched(&prompts(&["p"]), &fast_retry(1))
        .await;
    let overridden = dispatcher
        .generate_batched(
            &prompts(&["p"]),
            &fast_retry(1).with_temperature(0.9).with_max_tokens(64),
        )
        .await;

    assert_eq!(defaults, vec!["defaults"]);
    assert_eq!(overridden, vec!["overridden"]);
}

#[tokio::test]
async fn test_service_error_is_not_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": "429", "message": "Requests to the deployment have exceeded the rate limit" }
        })))
        .mount(&server)
        .await;

    let provider = AzureOpenAIProvider::new(azure_config(&server)).unwrap();
    let err = provider
        .complete(&GenerationRequest::new("hi", 0.5, 10), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_service_error());
    assert!(err.to_string().contains("rate limit"));

    let outcomes = dispatcher(&server)
        .generate_batched_detailed(&prompts(&["hi"]), &fast_retry(3))
        .await;
    assert_eq!(outcomes[0].text, "");
    assert_eq!(outcomes[0].attempts, 3);
}

#[tokio::test]
async fn test_malformed_body_is_transport_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let provider = AzureOpenAIProvider::new(azure_config(&server)).unwrap();
    let err = provider
        .complete(&GenerationRequest::new("hi", 0.5, 10), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
    assert!(err.is_transport_fault());
}

#[tokio::test]
async fn test_round_trip_fixed_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(completion("fixed completion"))
        .expect(2)
        .mount(&server)
        .await;

    let results = dispatcher(&server)
        .generate_batched(&prompts(&["p1", "p2"]), &BatchOptions::new())
        .await;

    assert_eq!(results, vec!["fixed completion", "fixed completion"]);
}

#[tokio::test]
async fn test_results_follow_input_order() {
    let server = MockServer::start().await;
    for (prompt, delay_ms) in [("first", 300), ("second", 150), ("third", 0)] {
        Mock::given(method("POST"))
            .and(body_json(payload(prompt)))
            .respond_with(
                completion(&format!("answer to {prompt}"))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let results = dispatcher(&server)
        .generate_batched(&prompts(&["first", "second", "third"]), &fast_retry(1))
        .await;

    assert_eq!(
        results,
        vec!["answer to first", "answer to second", "answer to third"]
    );
}

#[tokio::test]
async fn test_failing_sibling_does_not_affect_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(payload("A")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "internal error" }
        })))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(payload("B")))
        .respond_with(completion("B's completion"))
        .expect(1)
        .mount(&server)
        .await;

    let results = dispatcher(&server)
        .generate_batched(&prompts(&["A", "B"]), &fast_retry(4))
        .await;

    assert_eq!(results, vec!["", "B's completion"]);
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    // Mounted first and exhausted after two hits, then the success mock takes over.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("eventually"))
        .expect(1)
        .mount(&server)
        .await;

    let outcomes = dispatcher(&server)
        .generate_batched_detailed(&prompts(&["retry me"]), &fast_retry(10))
        .await;

    assert_eq!(outcomes[0].text, "eventually");
    assert_eq!(outcomes[0].attempts, 3);
}

#[tokio::test]
async fn test_timeout_counts_as_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("too late").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let options = BatchOptions::new().with_retry(
        RetryPolicy::default()
            .with_max_attempts(2)
            .with_timeout(Duration::from_millis(50))
            .with_retry_delay(Duration::from_millis(10)),
    );
    let outcomes = dispatcher(&server)
        .generate_batched_detailed(&prompts(&["slow"]), &options)
        .await;

    assert_eq!(outcomes[0].text, "");
    assert_eq!(outcomes[0].attempts, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_endpoint_yields_empty_results() {
    let config = AzureConfig::new("http://127.0.0.1:1", "k", DEPLOYMENT, "gpt-35-turbo");
    let dispatcher = Dispatcher::new(
        AzureOpenAIProvider::new(config).unwrap(),
        GenerationConfig::new("gpt-35-turbo"),
    );

    let results = dispatcher
        .generate_batched(&prompts(&["a", "b"]), &fast_retry(2))
        .await;

    assert_eq!(results, vec!["", ""]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_factory_generator_blocking_entry_point() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(completion("from the factory"))
        .expect(2)
        .mount(&server)
        .await;

    let generator = GeneratorFactory::create(&GeneratorConfig::azure(azure_config(&server)))
        .unwrap();

    // The blocking entry point owns its runtime, so it runs on a plain thread.
    let results = std::thread::spawn(move || {
        generator.generate_batched_blocking(&prompts(&["x", "y"]), &BatchOptions::new())
    })
    .join()
    .unwrap()
    .unwrap();

    assert_eq!(results, vec!["from the factory", "from the factory"]);
}

#[test]
fn test_error_creation() {
    let error = Error::service("AzureOpenAI", "Test error");
    assert!(error.to_string().contains("AzureOpenAI"));
    assert!(error.to_string().contains("Test error"));

    let config_error = Error::config("Invalid deployment");
    assert!(config_error.to_string().contains("Invalid configuration"));
}
