//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chat/sessions
//! - GET    /api/v1/chat/sessions/{id}
//! - DELETE /api/v1/chat/sessions/{id}
//! - POST   /api/v1/chat/sessions/{id}/messages
//! - POST   /api/v1/chat/sessions/{id}/actions/summarise
//! - POST   /api/v1/chat/sessions/{id}/clear
//! - GET    /api/v1/chat/sessions/{id}/notifications

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mentorhub_core::chat::assistant::Assistant;
use mentorhub_core::chat::session::{ConversationSnapshot, SharedConversation};
use mentorhub_core::render::{render_as, to_html};
use mentorhub_types::chat::{
    CannedAction, ExchangeOutcome, Message, MessageId, Notification, Role, ViewEvent,
};
use mentorhub_types::render::{ElementKind, RenderedNode};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub assistant: Option<Assistant>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// One transcript entry with its rendered form.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub rendered: RenderedNode,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub assistant: Assistant,
    pub display_name: &'static str,
    pub pending: bool,
    pub supports_summarise: bool,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<MessageView>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeView {
    pub session: SessionView,
    pub outcome: ExchangeOutcome,
    pub view_events: Vec<ViewEvent>,
}

/// Assistant content goes through the assistant's render mode. User text is
/// never interpreted as markup.
fn render_message(assistant: Assistant, message: &Message) -> RenderedNode {
    match message.role {
        Role::Assistant => render_as(assistant.content_format(), &message.content),
        Role::User => RenderedNode::element(
            ElementKind::Document,
            vec![RenderedNode::element(
                ElementKind::Paragraph,
                vec![RenderedNode::text(message.content.clone())],
            )],
        ),
    }
}

fn message_view(assistant: Assistant, message: &Message) -> MessageView {
    let rendered = render_message(assistant, message);
    let html = to_html(&rendered);
    MessageView {
        id: message.id,
        role: message.role,
        content: message.content.clone(),
        created_at: message.created_at,
        rendered,
        html,
    }
}

fn session_view(id: Uuid, snapshot: &ConversationSnapshot) -> SessionView {
    let assistant = snapshot.assistant;
    SessionView {
        id,
        assistant,
        display_name: assistant.display_name(),
        pending: snapshot.state.is_pending(),
        supports_summarise: assistant.supports_summarise(),
        created_at: snapshot.created_at,
        transcript: snapshot
            .transcript
            .iter()
            .map(|m| message_view(assistant, m))
            .collect(),
    }
}

fn parse_session_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation {
        field: Some("id".to_string()),
        message: format!("Invalid session id: '{id}'"),
    })
}

fn lookup(state: &AppState, id: &str) -> Result<(Uuid, SharedConversation), AppError> {
    let uuid = parse_session_id(id)?;
    state
        .session(&uuid)
        .map(|conversation| (uuid, conversation))
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

fn session_links<T: Serialize>(resp: ApiResponse<T>, id: Uuid) -> ApiResponse<T> {
    resp.with_link("self", &format!("/api/v1/chat/sessions/{id}"))
        .with_link("messages", &format!("/api/v1/chat/sessions/{id}/messages"))
}

/// Turn a settled exchange into a response. A rolled-back exchange is an
/// upstream failure that still carries the restored transcript.
fn settle(
    timer: RequestTimer,
    id: Uuid,
    conversation: &SharedConversation,
    outcome: ExchangeOutcome,
) -> Result<Json<ApiResponse<ExchangeView>>, AppError> {
    let view_events = conversation.drain_view_events();
    let session = session_view(id, &conversation.snapshot());

    match outcome {
        ExchangeOutcome::Replied { .. } => {
            let resp = timer.success(ExchangeView {
                session,
                outcome,
                view_events,
            });
            Ok(Json(session_links(resp, id)))
        }
        ExchangeOutcome::RolledBack { reason, timed_out } => {
            let transcript = serde_json::to_value(&session.transcript).ok();
            if timed_out {
                Err(AppError::Timeout {
                    message: reason,
                    transcript,
                })
            } else {
                Err(AppError::Upstream {
                    message: reason,
                    transcript,
                })
            }
        }
        ExchangeOutcome::Stale => Err(AppError::Internal(
            "exchange was superseded before it settled".to_string(),
        )),
    }
}

/// POST /api/v1/chat/sessions
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), AppError> {
    let timer = RequestTimer::start();
    // An empty body selects the default assistant.
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let assistant = req.assistant.unwrap_or(Assistant::Guide);

    let (id, conversation) = state.open_session(assistant);
    let view = session_view(id, &conversation.snapshot());
    let resp = session_links(timer.success(view), id);
    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chat/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let timer = RequestTimer::start();
    let (uuid, conversation) = lookup(&state, &id)?;
    let view = session_view(uuid, &conversation.snapshot());
    Ok(Json(session_links(timer.success(view), uuid)))
}

/// DELETE /api/v1/chat/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid = parse_session_id(&id)?;
    if state.close_session(&uuid) {
        tracing::debug!(session = %uuid, "chat session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id))
    }
}

/// POST /api/v1/chat/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ExchangeView>>, AppError> {
    let timer = RequestTimer::start();
    let (uuid, conversation) = lookup(&state, &id)?;
    let Json(req) = payload?;

    let outcome = conversation
        .submit(&req.message, state.boundary.as_ref())
        .await?;
    settle(timer, uuid, &conversation, outcome)
}

/// POST /api/v1/chat/sessions/{id}/actions/summarise
pub async fn summarise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ExchangeView>>, AppError> {
    let timer = RequestTimer::start();
    let (uuid, conversation) = lookup(&state, &id)?;
    if !conversation.assistant().supports_summarise() {
        return Err(AppError::validation(format!(
            "{} does not support the summarise action",
            conversation.assistant().display_name()
        )));
    }

    let outcome = conversation
        .submit_canned_action(CannedAction::SummariseConcept, state.boundary.as_ref())
        .await?;
    settle(timer, uuid, &conversation, outcome)
}

/// POST /api/v1/chat/sessions/{id}/clear
pub async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let timer = RequestTimer::start();
    let (uuid, conversation) = lookup(&state, &id)?;
    conversation.clear()?;
    let view = session_view(uuid, &conversation.snapshot());
    Ok(Json(session_links(timer.success(view), uuid)))
}

/// GET /api/v1/chat/sessions/{id}/notifications
///
/// Draining: each notification is returned once.
pub async fn notifications(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let timer = RequestTimer::start();
    let (_, conversation) = lookup(&state, &id)?;
    Ok(Json(timer.success(conversation.drain_notifications())))
}
