//! Shared test harness: a full application router over in-memory
//! collaborators, mirroring the construction in `main.rs` so tests
//! exercise the same middleware stack production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use aegle_ai::StubClassifier;
use aegle_cache::MemoryCache;
use aegle_core::triage::UrgencyLevel;
use aegle_db::memory::MemoryStore;
use aegle_engine::{EngineConfig, LifecycleEngine, Notifier};
use aegle_events::DeliveryChannel;

use aegle_api::config::ServerConfig;
use aegle_api::router::build_app_router;
use aegle_api::state::AppState;

/// A built application plus handles to its in-memory collaborators.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub channel: Arc<DeliveryChannel>,
    pub classifier: Arc<StubClassifier>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        ai_service_url: "http://localhost:8001".to_string(),
    }
}

/// Build the application with a stub classifier pinned to `urgency`.
pub fn build_test_app(urgency: UrgencyLevel) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let channel = Arc::new(DeliveryChannel::new());
    let classifier = Arc::new(StubClassifier::with_urgency(urgency));

    let engine_config = EngineConfig::default();
    let notifier = Arc::new(Notifier::new(
        store.clone(),
        cache.clone(),
        channel.clone(),
        engine_config.clone(),
    ));
    let engine = Arc::new(LifecycleEngine::new(
        store.clone(),
        store.clone(),
        cache.clone(),
        notifier.clone(),
        engine_config,
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        notifier,
        channel: channel.clone(),
        classifier: classifier.clone(),
        store: store.clone(),
    };

    TestApp {
        app: build_app_router(state, &config),
        store,
        cache,
        channel,
        classifier,
    }
}

/// The identity headers an upstream gateway would set.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub role: &'static str,
}

impl Caller {
    pub fn patient() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "patient",
        }
    }

    pub fn doctor(id: Uuid) -> Self {
        Self { id, role: "doctor" }
    }
}

/// Issue a request with identity headers and an optional JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<Caller>,
    body: Option<serde_json::Value>,
) -> Response<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder
            .header("x-user-id", caller.id.to_string())
            .header("x-user-role", caller.role);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, caller: Caller) -> Response<axum::body::Body> {
    send(app, Method::GET, uri, Some(caller), None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    caller: Caller,
    body: serde_json::Value,
) -> Response<axum::body::Body> {
    send(app, Method::POST, uri, Some(caller), Some(body)).await
}

pub async fn post(app: &Router, uri: &str, caller: Caller) -> Response<axum::body::Body> {
    send(app, Method::POST, uri, Some(caller), None).await
}

pub async fn delete(app: &Router, uri: &str, caller: Caller) -> Response<axum::body::Body> {
    send(app, Method::DELETE, uri, Some(caller), None).await
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn expect_json(
    response: Response<axum::body::Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
