//! Application router assembly.
//!
//! Both `main.rs` and the integration-test harness build the service
//! through [`build_app_router`], so every test request crosses the same
//! middleware the production binary runs.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assemble the full service: `/health` at the root, the versioned API
/// under `/api/v1`, and the middleware stack wrapped around both.
///
/// Axum applies layers bottom-up, so reading the chain from the last
/// `.layer()` call upward gives the order a request traverses: CORS,
/// then request-id stamping, tracing, request-id propagation onto the
/// response, the timeout, and finally panic recovery outermost.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS policy for the browser origins listed in `CORS_ORIGINS`.
///
/// Origins are parsed eagerly; a malformed entry panics at startup
/// instead of serving a policy with that origin silently missing.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = Vec::with_capacity(config.cors_origins.len());
    for origin in &config.cors_origins {
        match origin.parse() {
            Ok(value) => origins.push(value),
            Err(e) => panic!("CORS origin '{origin}' is not a valid header value: {e}"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
