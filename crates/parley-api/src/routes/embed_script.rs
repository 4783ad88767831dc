use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use parley_types::validate::is_valid_embed_code;
use std::sync::Arc;

use crate::state::AppState;

const JAVASCRIPT: &str = "application/javascript; charset=utf-8";
const SCRIPT_CACHE_CONTROL: &str = "public, max-age=3600";

/// Serve the standalone widget script for an embed
///
/// Unknown but well-formed codes get the default widget so a typo in a
/// dashboard never breaks the host page.
#[utoipa::path(
    get,
    path = "/embed-script/{script}",
    params(
        ("script" = String, Path, description = "Embed code followed by `.js`, e.g. `abc123.js`")
    ),
    responses(
        (status = 200, description = "Widget script", content_type = "application/javascript", body = String),
        (status = 404, description = "Malformed embed code", content_type = "application/javascript", body = String)
    ),
    tag = "embed"
)]
pub async fn embed_script(
    State(state): State<Arc<AppState>>,
    Path(script): Path<String>,
) -> Response {
    let embed_code = script.strip_suffix(".js").unwrap_or(&script);

    if !is_valid_embed_code(embed_code) {
        return (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, JAVASCRIPT)],
            "/* Parley: invalid embed code */\n",
        )
            .into_response();
    }

    let resolved = state.resolver.resolve_or_default(embed_code).await;
    let body = state.materializer.materialize(&resolved.config);

    (
        [
            (header::CONTENT_TYPE, JAVASCRIPT),
            (header::CACHE_CONTROL, SCRIPT_CACHE_CONTROL),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}
