use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use parley_api::{build_router, config::Config, state::AppState};
use parley_llm::{ChatClient, ChatRequest, ChatResponse};
use parley_persist::MemoryStore;
use parley_types::{AgentRecord, EmbedRecord};

/// Counting stand-in for the OpenAI client
struct MockChat {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl ChatClient for MockChat {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("OpenAI API error (503 Service Unavailable): overloaded");
        }
        Ok(ChatResponse {
            content: Some("Hello from Support Bot".to_string()),
            usage: None,
            finish_reason: Some("stop".to_string()),
        })
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    llm: Arc<MockChat>,
}

async fn test_app(fail_ai: bool, per_hour: u32) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mut agent =
        AgentRecord::new("user-1", "Support Bot").with_system_prompt("You are concise.");
    agent.id = "agent-1".to_string();
    agent.primary_color = Some("#10B981".to_string());
    store.insert_agent(agent).await;
    let mut embed = EmbedRecord::new("abc123", Some("agent-1".to_string()));
    embed.id = "embed-1".to_string();
    embed.max_requests_per_hour = Some(per_hour);
    store.insert_embed(embed).await;

    let llm = Arc::new(MockChat {
        fail: fail_ai,
        calls: AtomicUsize::new(0),
    });

    let mut config = Config::default();
    config.embed.cache_ttl_secs = 0;
    config.public.development_base_url = "http://localhost:8000".to_string();

    let state = Arc::new(AppState::new(config, store.clone(), llm.clone()));
    TestApp {
        router: build_router(state),
        store,
        llm,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_embed_script_for_known_code() {
    let app = test_app(false, 100).await;
    let (status, headers, body) = send(&app.router, get("/embed-script/abc123.js")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(body.contains("    name: 'Support Bot',\n"));
    assert!(body.contains("    primaryColor: '#10B981',\n"));
    assert!(body.contains("    apiUrl: 'http://localhost:8000/public-chat',\n"));
    assert!(!body.contains("You are concise."));
}

#[tokio::test]
async fn test_embed_script_for_unknown_code_uses_defaults() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(&app.router, get("/embed-script/doesnotexist.js")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("    embedCode: 'doesnotexist',\n"));
    assert!(body.contains("    name: 'AI Assistant',\n"));
}

#[tokio::test]
async fn test_embed_script_rejects_malformed_code() {
    let app = test_app(false, 100).await;
    let (status, headers, body) = send(&app.router, get("/embed-script/abc%27%3B.js")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    assert!(body.starts_with("/*"));
}

#[tokio::test]
async fn test_preview_references_script_url() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(&app.router, get("/embed-preview/abc123")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<script src="http://localhost:8000/embed-script/abc123.js" async></script>"#));
}

#[tokio::test]
async fn test_preview_inlines_overrides() {
    let app = test_app(false, 100).await;
    // {"name":"Preview Bot","primaryColor":"#000000"}
    let uri = "/embed-preview/abc123?config=%7B%22name%22%3A%22Preview%20Bot%22%2C%22primaryColor%22%3A%22%23000000%22%7D";
    let (status, _, body) = send(&app.router, get(uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("    name: 'Preview Bot',\n"));
    assert!(body.contains("    primaryColor: '#000000',\n"));
    assert!(!body.contains("You are concise."));
}

#[tokio::test]
async fn test_preview_rejects_bad_config_json() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(&app.router, get("/embed-preview/abc123?config=%7Bnope")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("config"));
}

#[tokio::test]
async fn test_public_chat_happy_path() {
    let app = test_app(false, 100).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/public-chat")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .header(header::USER_AGENT, "Mozilla/5.0 (test)")
        .body(Body::from(
            json!({"embedCode": "abc123", "message": "Hello", "sessionId": "s1"}).to_string(),
        ))
        .unwrap();

    let (status, _, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({"message": "Hello from Support Bot", "sessionId": "s1"}));

    let conversations = app.store.conversations().await;
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].visitor_ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(conversations[0].user_agent.as_deref(), Some("Mozilla/5.0 (test)"));
    assert_eq!(app.store.messages().await.len(), 2);
}

#[tokio::test]
async fn test_public_chat_validation_error() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(
        &app.router,
        post_json("/public-chat", json!({"embedCode": "abc123", "sessionId": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Invalid request");
    assert_eq!(json["details"], "message is required");
    assert_eq!(app.llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_public_chat_rejects_malformed_embed_code() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(
        &app.router,
        post_json(
            "/public-chat",
            json!({"embedCode": "abc'; x", "message": "Hello", "sessionId": "s1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["details"], "embedCode is not valid");
    assert_eq!(app.llm.calls.load(Ordering::SeqCst), 0);
    assert!(app.store.conversations().await.is_empty());
}

#[tokio::test]
async fn test_public_chat_ai_failure_is_200_with_error() {
    let app = test_app(true, 100).await;
    let (status, _, body) = send(
        &app.router,
        post_json(
            "/public-chat",
            json!({"embedCode": "abc123", "message": "Hello", "sessionId": "s1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "AI API error");
    assert_eq!(
        json["message"],
        "I'm sorry, I'm having trouble processing your request right now. Please try again in a moment."
    );
    assert!(!body.contains("overloaded"));
}

#[tokio::test]
async fn test_public_chat_rate_limited() {
    let app = test_app(false, 1).await;
    let request = || {
        post_json(
            "/public-chat",
            json!({"embedCode": "abc123", "message": "Hello", "sessionId": "s1"}),
        )
    };

    let (_, _, first) = send(&app.router, request()).await;
    assert!(serde_json::from_str::<Value>(&first).unwrap()["error"].is_null());

    let (status, _, second) = send(&app.router, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&second).unwrap()["error"],
        "Rate limit exceeded"
    );
    assert_eq!(app.llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_public_chat_preflight() {
    let app = test_app(false, 100).await;
    let bare = Request::builder()
        .method(Method::OPTIONS)
        .uri("/public-chat")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app.router, bare).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let cors = Request::builder()
        .method(Method::OPTIONS)
        .uri("/public-chat")
        .header(header::ORIGIN, "https://acme.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app.router, cors).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_analytics_always_succeeds() {
    let app = test_app(false, 100).await;

    let (status, _, body) = send(
        &app.router,
        post_json(
            "/embed-analytics",
            json!({"embedCode": "abc123", "eventType": "widget_loaded", "sessionId": "s1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"success": true}));
    assert_eq!(app.store.analytics_events().await.len(), 1);

    app.store.set_writes_down(true);
    let (status, _, body) = send(
        &app.router,
        post_json("/embed-analytics", json!({"embedCode": "abc123", "eventType": "widget_opened"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"success": true}));

    let (status, _, _) = send(&app.router, post_json("/embed-analytics", json!("garbage"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_store_state() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["services"]["store"], "connected");

    app.store.set_reads_down(true);
    let (status, _, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["services"]["store"], "disconnected");
}

#[tokio::test]
async fn test_openapi_document_lists_public_routes() {
    let app = test_app(false, 100).await;
    let (status, _, body) = send(&app.router, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_str(&body).unwrap();
    for path in ["/health", "/public-chat", "/embed-analytics", "/embed-script/{script}"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}
