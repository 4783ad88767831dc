use axum::Json;
use utoipa::OpenApi;

use crate::routes::{analytics, embed_preview, embed_script, health, public_chat};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parley API",
        description = "Public endpoints behind the embeddable chat widget"
    ),
    paths(
        health::health_check,
        embed_script::embed_script,
        embed_preview::embed_preview,
        public_chat::public_chat,
        analytics::embed_analytics,
    ),
    components(schemas(
        health::HealthResponse,
        public_chat::PublicChatRequest,
        public_chat::PublicChatResponse,
        analytics::AnalyticsResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "embed", description = "Widget scripts, previews and analytics"),
        (name = "chat", description = "Public chat relay")
    )
)]
pub struct ApiDoc;

/// OpenAPI document of the public surface
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
