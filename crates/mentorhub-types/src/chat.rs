//! Chat transcript types for Mentor Hub.
//!
//! A conversation is an append-only transcript of [`Message`]s owned by a
//! single controller, plus an explicit [`ConversationState`] that replaces
//! the bare "pending" flag.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::llm::MessageRole;

/// Who authored a transcript entry.
///
/// Rendering branches on this enum, never on a role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

/// Identity of a single transcript entry (UUID v7, time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one submit/reply exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(pub Uuid);

impl ExchangeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed transcript entry. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Single-flight state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    Pending { exchange: ExchangeId },
}

impl ConversationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ConversationState::Pending { .. })
    }
}

/// Request sent across the model-call boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The full user-visible text, passed through unmodified.
    pub text: String,
    /// Fixed system/persona instruction.
    pub instruction: String,
    /// JSON schema describing the expected reply shape.
    pub reply_schema: serde_json::Value,
}

/// Structured reply object returned by the model-call boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelReply {
    /// The assistant's reply text.
    pub response: String,
}

/// Ticket handed out when a submission is accepted.
///
/// Rollback uses `user_message_id`, never content equality.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub id: ExchangeId,
    pub user_message_id: MessageId,
    pub request: ModelRequest,
}

/// How one exchange settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    Replied { message_id: MessageId },
    /// The user message was removed again. `timed_out` separates a model
    /// timeout from other failures.
    RolledBack {
        reason: String,
        #[serde(default)]
        timed_out: bool,
    },
    /// The ticket did not match the in-flight exchange; nothing changed.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Error,
    Info,
}

/// Transient, non-blocking alert for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Side effects a transcript view should follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewEvent {
    ScrollToBottom,
    ClearInput,
}

/// Fixed sentinels submitted through the normal chat pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CannedAction {
    SummariseConcept,
}

impl CannedAction {
    /// The opaque sentinel agreed with the assistant's prompt template.
    pub fn token(&self) -> &'static str {
        match self {
            CannedAction::SummariseConcept => "[ACTION:SUMMARISE_CONCEPT]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_maps_to_wire_role() {
        assert_eq!(MessageRole::from(Role::User), MessageRole::User);
        assert_eq!(MessageRole::from(Role::Assistant), MessageRole::Assistant);
    }

    #[test]
    fn test_role_parse_rejects_system() {
        assert!("system".parse::<Role>().is_err());
        assert_eq!("Assistant".parse::<Role>().unwrap(), Role::Assistant);
    }

    #[test]
    fn test_message_ids_are_unique_for_identical_content() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
        assert_eq!(a.content, b.content);
    }

    #[test]
    fn test_conversation_state_serializes_tagged() {
        let json = serde_json::to_value(ConversationState::Idle).unwrap();
        assert_eq!(json["state"], "idle");

        let exchange = ExchangeId::new();
        let pending = ConversationState::Pending { exchange };
        assert!(pending.is_pending());
        let json = serde_json::to_value(pending).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["exchange"], exchange.to_string());
    }

    #[test]
    fn test_canned_action_token() {
        assert_eq!(
            CannedAction::SummariseConcept.token(),
            "[ACTION:SUMMARISE_CONCEPT]"
        );
    }

    #[test]
    fn test_model_reply_schema_requires_response() {
        let schema = serde_json::to_value(schemars::schema_for!(ModelReply)).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "response"));
    }
}
