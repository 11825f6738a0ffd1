//! Render preview endpoint.
//!
//! POST /api/v1/render turns markdown or a trusted HTML fragment into the
//! rendered node tree, its escaped HTML serialization, and plain text.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use mentorhub_core::render::{render_as, to_html, to_plain_text};
use mentorhub_types::render::{ContentFormat, RenderedNode};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub content: String,
    #[serde(default)]
    pub format: ContentFormat,
}

#[derive(Debug, Serialize)]
pub struct RenderResult {
    pub rendered: RenderedNode,
    pub html: String,
    pub plain: String,
}

pub async fn render_content(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RenderResult>>, AppError> {
    let timer = RequestTimer::start();
    let Json(req) = payload?;

    // Highlighting and tokenizing are CPU-bound; keep them off the executor.
    let result = tokio::task::spawn_blocking(move || {
        let rendered = render_as(req.format, &req.content);
        let html = to_html(&rendered);
        let plain = to_plain_text(&rendered);
        RenderResult {
            rendered,
            html,
            plain,
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("render task failed: {e}")))?;

    Ok(Json(timer.success(result)))
}
