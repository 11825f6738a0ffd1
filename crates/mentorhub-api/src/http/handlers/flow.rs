//! Form flow HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/flows/learning-path
//! - POST /api/v1/flows/code-snippet
//! - POST /api/v1/flows/project-ideas
//! - POST /api/v1/flows/concept-explainer

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use serde::de::DeserializeOwned;

use mentorhub_core::flow::Flow;
use mentorhub_core::render::{render, to_html};
use mentorhub_types::flow::{
    CodeSnippetInput, CodeSnippetOutput, ConceptExplainerInput, ConceptExplainerOutput,
    LearningPathInput, LearningPathOutput, ProjectIdeasInput, ProjectIdeasOutput,
};
use mentorhub_types::render::RenderedNode;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// A flow's structured output plus its primary content, rendered.
#[derive(Debug, Serialize)]
pub struct FlowResult<T: Serialize> {
    pub output: T,
    pub markdown: String,
    pub rendered: RenderedNode,
    pub rendered_html: String,
}

async fn run_flow<F: Flow + DeserializeOwned>(
    state: &AppState,
    payload: Result<Json<F>, JsonRejection>,
) -> Result<Json<ApiResponse<FlowResult<F::Output>>>, AppError> {
    let timer = RequestTimer::start();
    let Json(input) = payload?;

    let output = state.flows.run(&input).await?;
    let markdown = F::markdown(&output);
    let rendered = render(&markdown);
    let rendered_html = to_html(&rendered);

    tracing::info!(flow = F::NAME, "flow completed");
    let resp = timer
        .success(FlowResult {
            output,
            markdown,
            rendered,
            rendered_html,
        })
        .with_link("self", &format!("/api/v1/flows/{}", F::NAME));
    Ok(Json(resp))
}

pub async fn learning_path(
    State(state): State<AppState>,
    payload: Result<Json<LearningPathInput>, JsonRejection>,
) -> Result<Json<ApiResponse<FlowResult<LearningPathOutput>>>, AppError> {
    run_flow(&state, payload).await
}

pub async fn code_snippet(
    State(state): State<AppState>,
    payload: Result<Json<CodeSnippetInput>, JsonRejection>,
) -> Result<Json<ApiResponse<FlowResult<CodeSnippetOutput>>>, AppError> {
    run_flow(&state, payload).await
}

pub async fn project_ideas(
    State(state): State<AppState>,
    payload: Result<Json<ProjectIdeasInput>, JsonRejection>,
) -> Result<Json<ApiResponse<FlowResult<ProjectIdeasOutput>>>, AppError> {
    run_flow(&state, payload).await
}

pub async fn concept_explainer(
    State(state): State<AppState>,
    payload: Result<Json<ConceptExplainerInput>, JsonRejection>,
) -> Result<Json<ApiResponse<FlowResult<ConceptExplainerOutput>>>, AppError> {
    run_flow(&state, payload).await
}
