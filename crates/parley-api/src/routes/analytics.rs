use axum::{extract::State, Json};
use parley_types::AnalyticsEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    pub success: bool,
}

/// Widget analytics beacon
///
/// Best effort: the widget never waits on or reacts to this, so the response
/// is always `{"success": true}` and malformed events are dropped.
#[utoipa::path(
    post,
    path = "/embed-analytics",
    request_body(content = Object, description = "Event with embedCode, eventType and optional sessionId, pageUrl, referrer, userAgent, metadata"),
    responses(
        (status = 200, description = "Always acknowledged", body = AnalyticsResponse)
    ),
    tag = "embed"
)]
pub async fn embed_analytics(State(state): State<Arc<AppState>>, body: String) -> Json<AnalyticsResponse> {
    match parse_event(&body) {
        Some(event) => {
            if let Err(e) = state.store.save_analytics_event(event).await {
                tracing::warn!(step = "analytics", error = %e, "Failed to store analytics event");
            }
        }
        None => tracing::debug!("Dropped malformed analytics event"),
    }

    Json(AnalyticsResponse { success: true })
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_event(raw: &str) -> Option<AnalyticsEvent> {
    let body: Value = serde_json::from_str(raw).ok()?;
    let mut event = AnalyticsEvent::new(text_field(&body, "embedCode")?, text_field(&body, "eventType")?);
    event.session_id = text_field(&body, "sessionId");
    event.page_url = text_field(&body, "pageUrl");
    event.referrer = text_field(&body, "referrer");
    event.user_agent = text_field(&body, "userAgent");
    if let Some(metadata) = body.get("metadata").filter(|m| m.is_object()) {
        event.metadata = metadata.clone();
    }
    Some(event)
}
