//! Conversation controller: the chat-session state machine.
//!
//! Owns an append-only transcript and an explicit `Idle | Pending` state.
//! A submission is split into [`ConversationController::begin`] (append the
//! user message, enter Pending) and [`ConversationController::resolve`]
//! (append the reply or roll back, return to Idle). Hosts that cannot hold
//! `&mut` across the model call drive those two halves themselves; see
//! `chat::session::SharedConversation`.

use mentorhub_types::chat::{
    CannedAction, ConversationState, ExchangeId, ExchangeOutcome, Message, Notification,
    PendingExchange, Role, ViewEvent,
};
use mentorhub_types::error::{ModelCallError, SubmitError};

use crate::chat::assistant::Assistant;
use crate::chat::boundary::{ModelCall, model_request};

pub const ERROR_TITLE: &str = "An error occurred";
pub const ERROR_DESCRIPTION: &str = "Failed to get a response. Please try again.";

/// Undrained notifications and view events kept per conversation. Older
/// entries are dropped first.
pub const MAX_OUTBOX: usize = 32;

fn push_bounded<T>(outbox: &mut Vec<T>, item: T) {
    if outbox.len() >= MAX_OUTBOX {
        outbox.remove(0);
    }
    outbox.push(item);
}

/// Single-flight owner of one conversation's transcript.
#[derive(Debug, Clone)]
pub struct ConversationController {
    greeting: String,
    instruction: String,
    transcript: Vec<Message>,
    state: ConversationState,
    notifications: Vec<Notification>,
    view_events: Vec<ViewEvent>,
}

impl ConversationController {
    /// Start a conversation seeded with exactly one assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            transcript: vec![Message::assistant(greeting.clone())],
            greeting,
            instruction: String::new(),
            state: ConversationState::Idle,
            notifications: Vec::new(),
            view_events: Vec::new(),
        }
    }

    /// Conversation for one of the built-in assistants.
    pub fn for_assistant(assistant: Assistant) -> Self {
        Self::new(assistant.greeting()).with_instruction(assistant.instruction())
    }

    /// Persona instruction attached to every model request.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn drain_view_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.view_events)
    }

    /// Accept a submission.
    ///
    /// The text is stored and sent exactly as entered; only the emptiness
    /// check looks at the trimmed form.
    pub fn begin(&mut self, text: &str) -> Result<PendingExchange, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.state.is_pending() {
            tracing::debug!("submission rejected, reply already pending");
            return Err(SubmitError::Busy);
        }

        let message = Message::user(text);
        let exchange = PendingExchange {
            id: ExchangeId::new(),
            user_message_id: message.id,
            request: model_request(&self.instruction, text),
        };
        self.transcript.push(message);
        self.state = ConversationState::Pending {
            exchange: exchange.id,
        };
        push_bounded(&mut self.view_events, ViewEvent::ScrollToBottom);

        tracing::debug!(exchange = %exchange.id, "conversation entered pending");
        Ok(exchange)
    }

    /// Settle an exchange handed out by [`begin`](Self::begin).
    pub fn resolve(
        &mut self,
        exchange: PendingExchange,
        result: Result<String, ModelCallError>,
    ) -> ExchangeOutcome {
        match self.state {
            ConversationState::Pending { exchange: current } if current == exchange.id => {}
            _ => {
                tracing::debug!(exchange = %exchange.id, "ignoring stale exchange");
                return ExchangeOutcome::Stale;
            }
        }

        let outcome = match result {
            Ok(reply) => {
                let message = Message::assistant(reply);
                let message_id = message.id;
                self.transcript.push(message);
                ExchangeOutcome::Replied { message_id }
            }
            Err(err) => {
                tracing::warn!(exchange = %exchange.id, error = %err, "model call failed, rolling back");
                self.transcript
                    .retain(|message| message.id != exchange.user_message_id);
                push_bounded(
                    &mut self.notifications,
                    Notification::error(ERROR_TITLE, ERROR_DESCRIPTION),
                );
                ExchangeOutcome::RolledBack {
                    reason: err.to_string(),
                    timed_out: matches!(err, ModelCallError::Timeout(_)),
                }
            }
        };

        self.state = ConversationState::Idle;
        push_bounded(&mut self.view_events, ViewEvent::ScrollToBottom);
        push_bounded(&mut self.view_events, ViewEvent::ClearInput);
        tracing::debug!(exchange = %exchange.id, "conversation returned to idle");
        outcome
    }

    /// Settle an exchange whose reply will never arrive.
    pub fn abandon(&mut self, exchange: PendingExchange) -> ExchangeOutcome {
        self.resolve(exchange, Err(ModelCallError::Cancelled))
    }

    /// `begin`, await the boundary, `resolve`.
    ///
    /// If the boundary panics or this future is dropped mid-await, the
    /// exchange is abandoned so the transcript is rolled back and the
    /// state returns to Idle.
    pub async fn submit<B: ModelCall>(
        &mut self,
        text: &str,
        boundary: &B,
    ) -> Result<ExchangeOutcome, SubmitError> {
        let exchange = self.begin(text)?;
        let request = exchange.request.clone();
        let guard = AbandonOnDrop {
            controller: self,
            exchange: Some(exchange),
        };
        let result = boundary.call(&request).await;
        Ok(guard.finish(result.map(|reply| reply.response)))
    }

    /// Send a fixed sentinel through the same pipeline as [`submit`](Self::submit).
    pub async fn submit_canned_action<B: ModelCall>(
        &mut self,
        action: CannedAction,
        boundary: &B,
    ) -> Result<ExchangeOutcome, SubmitError> {
        self.submit(action.token(), boundary).await
    }

    /// Reset the transcript to the greeting. Refused while a reply is pending.
    pub fn clear(&mut self) -> Result<(), SubmitError> {
        if self.state.is_pending() {
            return Err(SubmitError::Busy);
        }
        self.transcript = vec![Message::assistant(self.greeting.clone())];
        self.notifications.clear();
        push_bounded(&mut self.view_events, ViewEvent::ScrollToBottom);
        Ok(())
    }

    /// Number of assistant replies that follow a user message.
    pub fn answered_exchanges(&self) -> usize {
        self.transcript
            .windows(2)
            .filter(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            .count()
    }
}

struct AbandonOnDrop<'a> {
    controller: &'a mut ConversationController,
    exchange: Option<PendingExchange>,
}

impl AbandonOnDrop<'_> {
    fn finish(mut self, result: Result<String, ModelCallError>) -> ExchangeOutcome {
        match self.exchange.take() {
            Some(exchange) => self.controller.resolve(exchange, result),
            None => ExchangeOutcome::Stale,
        }
    }
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(exchange) = self.exchange.take() {
            self.controller.abandon(exchange);
        }
    }
}
