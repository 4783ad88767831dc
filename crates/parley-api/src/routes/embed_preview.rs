use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use parley_embed::{render_preview_page, PreviewScript};
use parley_types::{validate::is_valid_embed_code, PartialWidgetConfig};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// URL-encoded JSON `PartialWidgetConfig` applied above every stored tier
    pub config: Option<String>,
}

/// HTML page hosting the widget, optionally with unsaved theme overrides
#[utoipa::path(
    get,
    path = "/embed-preview/{embed_code}",
    params(
        ("embed_code" = String, Path, description = "Public embed code"),
        ("config" = Option<String>, Query, description = "JSON widget overrides")
    ),
    responses(
        (status = 200, description = "Preview page", content_type = "text/html", body = String),
        (status = 400, description = "Invalid override JSON"),
        (status = 404, description = "Malformed embed code")
    ),
    tag = "embed"
)]
pub async fn embed_preview(
    State(state): State<Arc<AppState>>,
    Path(embed_code): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Html<String>> {
    if !is_valid_embed_code(&embed_code) {
        return Err(ApiError::NotFound(format!("embed code {:?}", embed_code)));
    }

    let script = match query.config.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(raw) => {
            let overrides: PartialWidgetConfig = serde_json::from_str(raw)
                .map_err(|e| ApiError::BadRequest(format!("config is not valid JSON: {}", e)))?;
            let resolved = state.resolver.resolve_or_default(&embed_code).await;
            let config = overrides
                .sanitized()
                .or(resolved.config.into())
                .resolve(embed_code.as_str());
            PreviewScript::Inline(state.materializer.materialize(&config))
        }
        None => PreviewScript::Src(format!(
            "{}/embed-script/{}.js",
            state.base_url().trim_end_matches('/'),
            embed_code
        )),
    };

    Ok(Html(render_preview_page(&embed_code, script)))
}
