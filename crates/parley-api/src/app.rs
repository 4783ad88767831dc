use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    middleware::logging,
    routes::{analytics, embed_preview, embed_script, health, openapi, public_chat},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        // Widget delivery
        .route("/embed-script/:script", get(embed_script::embed_script))
        .route("/embed-preview/:embed_code", get(embed_preview::embed_preview))
        // Widget callbacks (called cross-origin from host pages)
        .route(
            "/public-chat",
            post(public_chat::public_chat).options(public_chat::public_chat_preflight),
        )
        .route("/embed-analytics", post(analytics::embed_analytics));

    routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Widgets run on arbitrary third-party origins
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
