use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use parley_relay::{ChatReply, ChatTurn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Message posted by the widget
///
/// Every field is optional at the wire level so missing ones surface as a
/// structured validation error instead of a deserializer rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicChatRequest {
    pub embed_code: Option<String>,
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub visitor_ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicChatResponse {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ChatReply> for PublicChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            message: reply.message,
            session_id: reply.session_id,
            error: reply.error,
        }
    }
}

/// Relay a visitor message to the embed's AI persona
///
/// Rate limiting and AI failures are reported in `error` with status 200.
#[utoipa::path(
    post,
    path = "/public-chat",
    request_body = PublicChatRequest,
    responses(
        (status = 200, description = "Assistant reply, rate-limit notice or AI fallback", body = PublicChatResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "chat"
)]
pub async fn public_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<PublicChatRequest>, JsonRejection>,
) -> ApiResult<Json<PublicChatResponse>> {
    let Json(req) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let visitor_ip = req.visitor_ip.or_else(|| client_ip(&headers));
    let user_agent = req
        .user_agent
        .or_else(|| header_str(&headers, header::USER_AGENT.as_str()));

    let turn = ChatTurn::new(
        req.embed_code.unwrap_or_default(),
        req.message.unwrap_or_default(),
        req.session_id.unwrap_or_default(),
        visitor_ip,
        user_agent,
    )?;

    let reply = state.relay.handle(turn).await;
    Ok(Json(reply.into()))
}

/// CORS preflight for browsers that send a bare OPTIONS
pub async fn public_chat_preflight() -> StatusCode {
    StatusCode::OK
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|forwarded| {
            forwarded
                .split(',')
                .map(str::trim)
                .find(|hop| !hop.is_empty())
                .map(str::to_string)
        })
        .or_else(|| header_str(headers, "x-real-ip"))
}
