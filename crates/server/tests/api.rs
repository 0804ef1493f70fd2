use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use folio_chat_core::ExchangeServiceBuilder;
use folio_chat_core::api::{ChatResponse, ErrorResponse};
use folio_chat_server::handlers::HealthResponse;
use folio_chat_server::{AppState, create_router};
use folio_chat_test_model::{PresetFailure, TestModelProvider};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_app(provider: &TestModelProvider) -> Router {
    let exchange =
        ExchangeServiceBuilder::with_model_provider(provider.clone()).build();
    create_router(AppState::new(exchange), &[])
}

fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn question(text: &str) -> Value {
    json!({ "messages": [{ "role": "user", "content": text }] })
}

async fn read_json<T: DeserializeOwned>(
    resp: axum::response::Response,
) -> (StatusCode, T) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_chat() {
    let mut provider = TestModelProvider::default();
    provider.add_text_reply("HDO builds web apps.");
    provider.add_text_reply(r#"["What stack?", "Any AI work?", "Where?"]"#);

    let app = make_app(&provider);
    let resp = app
        .oneshot(chat_request(question("What does HDO do?").to_string()))
        .await
        .unwrap();
    let (status, body): (_, ChatResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response, "HDO builds web apps.");
    assert_eq!(body.suggestions, ["What stack?", "Any AI work?", "Where?"]);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn test_assistant_role_alias() {
    let mut provider = TestModelProvider::default();
    provider.add_text_reply("Mostly Rust.");
    provider.add_text_reply("[]");

    let body = json!({
        "messages": [
            { "role": "user", "content": "Hi" },
            { "role": "assistant", "content": "Hello!" },
            { "role": "user", "content": "Favorite language?" },
        ]
    });
    let resp = make_app(&provider)
        .oneshot(chat_request(body.to_string()))
        .await
        .unwrap();
    let (status, body): (_, ChatResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response, "Mostly Rust.");
    // Persona preamble and acknowledgment, then the three turns.
    assert_eq!(provider.requests()[0].messages.len(), 5);
}

#[tokio::test]
async fn test_rate_limited() {
    let mut provider = TestModelProvider::default();
    provider.add_failure(
        PresetFailure::Other,
        "Resource has been exhausted (e.g. check quota).",
    );

    let resp = make_app(&provider)
        .oneshot(chat_request(question("Hi").to_string()))
        .await
        .unwrap();
    let (status, body): (_, ErrorResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body.error,
        "Rate limit exceeded. Please try again in a moment."
    );
}

#[tokio::test]
async fn test_safety_filtered() {
    let mut provider = TestModelProvider::default();
    provider.add_failure(PresetFailure::Moderated, "blocked");

    let resp = make_app(&provider)
        .oneshot(chat_request(question("Hi").to_string()))
        .await
        .unwrap();
    let (status, body): (_, ErrorResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body.error,
        "Content filtered for safety. Please try a different question."
    );
}

#[tokio::test]
async fn test_generic_failure() {
    let mut provider = TestModelProvider::default();
    provider.add_failure(PresetFailure::Other, "connection reset");

    let resp = make_app(&provider)
        .oneshot(chat_request(question("Hi").to_string()))
        .await
        .unwrap();
    let (status, body): (_, ErrorResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error, "Failed to process chat request");
}

#[tokio::test]
async fn test_invalid_transcripts() {
    let provider = TestModelProvider::default();
    let bodies = [
        json!({ "messages": [] }).to_string(),
        json!({ "messages": [{ "role": "model", "content": "Hi" }] }).to_string(),
        json!({ "messages": [{ "role": "user", "content": "   " }] }).to_string(),
        json!({ "messages": [{ "role": "system", "content": "Hi" }] }).to_string(),
        "not json".to_owned(),
    ];

    for body in bodies {
        let resp = make_app(&provider)
            .oneshot(chat_request(body.clone()))
            .await
            .unwrap();
        let (status, err): (_, ErrorResponse) = read_json(resp).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(err.error.starts_with("Invalid chat request"), "body: {body}");
    }
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_health() {
    let provider = TestModelProvider::default();
    let resp = make_app(&provider)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body): (_, HealthResponse) = read_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}
