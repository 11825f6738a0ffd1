//! Shared conversation handle for multi-task hosts.
//!
//! The HTTP server runs each request on its own task, so a conversation
//! lives behind `Arc<Mutex<_>>`. The lock is only taken for the synchronous
//! `begin`/`resolve` halves and is never held across the model call.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use mentorhub_types::chat::{
    CannedAction, ConversationState, ExchangeOutcome, Message, Notification, PendingExchange,
    ViewEvent,
};
use mentorhub_types::error::{ModelCallError, SubmitError};

use crate::chat::assistant::Assistant;
use crate::chat::boundary::ModelCall;
use crate::chat::controller::ConversationController;

/// Default upper bound on one model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Point-in-time copy of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub assistant: Assistant,
    pub transcript: Vec<Message>,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
}

/// Cloneable handle to one conversation shared between tasks.
#[derive(Debug, Clone)]
pub struct SharedConversation {
    assistant: Assistant,
    created_at: DateTime<Utc>,
    timeout: Duration,
    last_used: Arc<Mutex<Instant>>,
    inner: Arc<Mutex<ConversationController>>,
}

impl SharedConversation {
    pub fn new(assistant: Assistant) -> Self {
        Self::from_controller(assistant, ConversationController::for_assistant(assistant))
    }

    pub fn from_controller(assistant: Assistant, controller: ConversationController) -> Self {
        Self {
            assistant,
            created_at: Utc::now(),
            timeout: DEFAULT_MODEL_TIMEOUT,
            last_used: Arc::new(Mutex::new(Instant::now())),
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn assistant(&self) -> Assistant {
        self.assistant
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let controller = self.lock();
        ConversationSnapshot {
            assistant: self.assistant,
            transcript: controller.transcript().to_vec(),
            state: controller.state(),
            created_at: self.created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    /// Mark the conversation as used now.
    pub fn touch(&self) {
        *self
            .last_used
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    /// Time since the last [`touch`](Self::touch) or settled exchange.
    pub fn idle_for(&self) -> Duration {
        self.last_used
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .elapsed()
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.lock().drain_notifications()
    }

    pub fn drain_view_events(&self) -> Vec<ViewEvent> {
        self.lock().drain_view_events()
    }

    pub fn clear(&self) -> Result<(), SubmitError> {
        self.lock().clear()
    }

    /// Submit `text` and wait for the exchange to settle.
    ///
    /// A second submit while one is in flight fails with
    /// [`SubmitError::Busy`]. If this future is dropped before the reply
    /// arrives, the exchange is abandoned.
    pub async fn submit<B: ModelCall>(
        &self,
        text: &str,
        boundary: &B,
    ) -> Result<ExchangeOutcome, SubmitError> {
        let exchange = self.lock().begin(text)?;
        let request = exchange.request.clone();
        let guard = AbandonGuard {
            conversation: &self.inner,
            exchange: Some(exchange),
        };

        let result = match tokio::time::timeout(self.timeout, boundary.call(&request)).await {
            Ok(result) => result.map(|reply| reply.response),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "model call timed out"
                );
                Err(ModelCallError::Timeout(self.timeout.as_secs()))
            }
        };

        let outcome = guard.finish(result);
        self.touch();
        Ok(outcome)
    }

    pub async fn submit_canned_action<B: ModelCall>(
        &self,
        action: CannedAction,
        boundary: &B,
    ) -> Result<ExchangeOutcome, SubmitError> {
        self.submit(action.token(), boundary).await
    }

    fn lock(&self) -> MutexGuard<'_, ConversationController> {
        lock_controller(&self.inner)
    }
}

// A panic under the lock cannot leave the controller half-mutated: every
// mutation completes before the guard is released.
fn lock_controller(mutex: &Mutex<ConversationController>) -> MutexGuard<'_, ConversationController> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct AbandonGuard<'a> {
    conversation: &'a Mutex<ConversationController>,
    exchange: Option<PendingExchange>,
}

impl AbandonGuard<'_> {
    fn finish(mut self, result: Result<String, ModelCallError>) -> ExchangeOutcome {
        match self.exchange.take() {
            Some(exchange) => lock_controller(self.conversation).resolve(exchange, result),
            None => ExchangeOutcome::Stale,
        }
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if let Some(exchange) = self.exchange.take() {
            tracing::debug!(exchange = %exchange.id, "submit dropped before reply, abandoning");
            lock_controller(self.conversation).abandon(exchange);
        }
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_types::chat::{ModelReply, ModelRequest, Role};
    use tokio::sync::Notify;

    use super::*;
    use crate::chat::boundary::FnModelCall;

    fn gated(gate: Arc<Notify>) -> impl ModelCall {
        FnModelCall(move |req: ModelRequest| {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok(ModelReply {
                    response: format!("re: {}", req.text),
                })
            }
        })
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_busy() {
        let conversation = SharedConversation::new(Assistant::Guide);
        let gate = Arc::new(Notify::new());
        let boundary = Arc::new(gated(gate.clone()));

        let first = {
            let conversation = conversation.clone();
            let boundary = boundary.clone();
            tokio::spawn(async move { conversation.submit("first", &boundary).await })
        };

        while !conversation.is_pending() {
            tokio::task::yield_now().await;
        }
        let second = conversation.submit("second", &boundary).await;
        assert_eq!(second.unwrap_err(), SubmitError::Busy);

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, ExchangeOutcome::Replied { .. }));

        let snapshot = conversation.snapshot();
        let roles: Vec<Role> = snapshot.transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(snapshot.transcript[2].content, "re: first");
        assert_eq!(snapshot.state, ConversationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_rolls_back() {
        let conversation =
            SharedConversation::new(Assistant::Tutor).with_timeout(Duration::from_secs(5));
        let gate = Arc::new(Notify::new());

        let outcome = conversation.submit("slow", &gated(gate)).await.unwrap();
        match outcome {
            ExchangeOutcome::RolledBack { reason, timed_out } => {
                assert!(timed_out);
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected rollback, got {other:?}"),
        }
        assert!(!conversation.is_pending());
        assert_eq!(conversation.snapshot().transcript.len(), 1);
        assert_eq!(conversation.drain_notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_aborted_task_abandons_exchange() {
        let conversation = SharedConversation::new(Assistant::Guide);
        let gate = Arc::new(Notify::new());
        let boundary = Arc::new(gated(gate));

        let task = {
            let conversation = conversation.clone();
            let boundary = boundary.clone();
            tokio::spawn(async move { conversation.submit("disconnect", &boundary).await })
        };
        while !conversation.is_pending() {
            tokio::task::yield_now().await;
        }

        task.abort();
        let _ = task.await;

        assert!(!conversation.is_pending());
        assert_eq!(conversation.snapshot().transcript.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_resets_on_touch() {
        let conversation = SharedConversation::new(Assistant::Guide);
        tokio::time::advance(Duration::from_secs(90)).await;
        assert!(conversation.idle_for() >= Duration::from_secs(90));

        conversation.clone().touch();
        assert!(conversation.idle_for() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_snapshot_reports_assistant_and_greeting() {
        let conversation = SharedConversation::new(Assistant::Tutor);
        let snapshot = conversation.snapshot();
        assert_eq!(snapshot.assistant, Assistant::Tutor);
        assert_eq!(snapshot.transcript[0].content, Assistant::Tutor.greeting());
    }
}
