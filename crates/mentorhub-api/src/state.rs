//! Application state wiring the provider, flows and chat sessions together.
//!
//! AppState is shared by the CLI commands and the REST API handlers. Chat
//! sessions live only in memory, in a concurrent map keyed by session id,
//! and expire after sitting idle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dashmap::DashMap;
use uuid::Uuid;

use mentorhub_core::chat::assistant::Assistant;
use mentorhub_core::chat::boundary::AssistantBoundary;
use mentorhub_core::chat::session::SharedConversation;
use mentorhub_core::flow::runner::FlowRunner;
use mentorhub_core::llm::box_provider::BoxLlmProvider;
use mentorhub_infra::config::{data_dir, load_global_config};
use mentorhub_infra::llm::create_provider;
use mentorhub_infra::secret::resolve_api_key;
use mentorhub_types::config::GlobalConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub provider: Arc<BoxLlmProvider>,
    pub flows: Arc<FlowRunner>,
    pub boundary: Arc<AssistantBoundary>,
    pub sessions: Arc<DashMap<Uuid, SharedConversation>>,
}

impl AppState {
    /// Load config, resolve the API key, and build the provider.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();
        let config = load_global_config(&data_dir).await;

        let api_key = resolve_api_key(&config.provider);
        if api_key.is_none() {
            anyhow::bail!(
                "{} is not set. Export it (or set provider.api_key_env in {}) and try again.",
                config.provider.api_key_env,
                data_dir.join(mentorhub_infra::config::CONFIG_FILE).display()
            );
        }
        let provider = create_provider(&config.provider, api_key.as_ref())
            .with_context(|| format!("failed to create provider '{}'", config.provider.name))?;

        tracing::info!(
            provider = %config.provider.name,
            model = %config.provider.model,
            "LLM provider ready"
        );
        Ok(Self::new(config, data_dir, provider))
    }

    pub fn new(config: GlobalConfig, data_dir: PathBuf, provider: BoxLlmProvider) -> Self {
        let provider = Arc::new(provider);
        let flows = FlowRunner::new(provider.clone(), &config);
        let boundary = AssistantBoundary::new(provider.clone(), &config.provider);
        Self {
            config: Arc::new(config),
            data_dir,
            provider,
            flows: Arc::new(flows),
            boundary: Arc::new(boundary),
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// A fresh conversation seeded with the assistant's greeting.
    pub fn new_conversation(&self, assistant: Assistant) -> SharedConversation {
        SharedConversation::new(assistant).with_timeout(self.model_timeout())
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.session_idle_secs)
    }

    /// Register a new session and return its id.
    ///
    /// Idle sessions are swept first. At the session cap, the longest-idle
    /// session without an exchange in flight is evicted.
    pub fn open_session(&self, assistant: Assistant) -> (Uuid, SharedConversation) {
        self.sweep_idle_sessions();
        if self.sessions.len() >= self.config.server.max_sessions {
            self.evict_longest_idle();
        }

        let id = Uuid::now_v7();
        let conversation = self.new_conversation(assistant);
        self.sessions.insert(id, conversation.clone());
        tracing::debug!(session = %id, %assistant, "chat session opened");
        (id, conversation)
    }

    /// Clone the session handle out of the map so no shard lock is held
    /// across an await.
    pub fn session(&self, id: &Uuid) -> Option<SharedConversation> {
        let conversation = self.sessions.get(id).map(|entry| entry.value().clone())?;
        conversation.touch();
        Some(conversation)
    }

    pub fn close_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle past the configured timeout. Returns how many went.
    pub fn sweep_idle_sessions(&self) -> usize {
        let idle_timeout = self.session_idle_timeout();
        let before = self.sessions.len();
        self.sessions.retain(|_, conversation| {
            conversation.is_pending() || conversation.idle_for() < idle_timeout
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "expired idle chat sessions");
        }
        removed
    }

    fn evict_longest_idle(&self) {
        let oldest = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().is_pending())
            .max_by_key(|entry| entry.value().idle_for())
            .map(|entry| *entry.key());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            tracing::debug!(session = %id, "session cap reached, evicted longest-idle session");
        }
    }

    /// Sweep idle sessions in the background until the runtime shuts down.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let period = (self.session_idle_timeout() / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.sweep_idle_sessions();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::llm::provider::LlmProvider;
    use mentorhub_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities,
    };

    use super::*;

    struct OfflineProvider(ProviderCapabilities);

    impl LlmProvider for OfflineProvider {
        fn name(&self) -> &str {
            "offline"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.0
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::Provider {
                message: "offline".to_string(),
            })
        }
    }

    fn state(idle_secs: u64, max_sessions: usize) -> AppState {
        let mut config = GlobalConfig::default();
        config.server.session_idle_secs = idle_secs;
        config.server.max_sessions = max_sessions;
        let provider = BoxLlmProvider::new(OfflineProvider(ProviderCapabilities {
            structured_output: true,
            max_context_tokens: 8192,
            max_output_tokens: 1024,
        }));
        AppState::new(config, PathBuf::from("/tmp/mentorhub-test"), provider)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let state = state(60, 100);
        let (stale, _) = state.open_session(Assistant::Guide);
        tokio::time::advance(Duration::from_secs(45)).await;
        let (fresh, _) = state.open_session(Assistant::Tutor);
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(state.sweep_idle_sessions(), 1);
        assert!(state.session(&stale).is_none());
        assert!(state.session(&fresh).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_keeps_session_alive() {
        let state = state(60, 100);
        let (id, _) = state.open_session(Assistant::Guide);
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(40)).await;
            assert!(state.session(&id).is_some());
            state.sweep_idle_sessions();
        }
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cap_evicts_longest_idle() {
        let state = state(3600, 2);
        let (first, _) = state.open_session(Assistant::Guide);
        tokio::time::advance(Duration::from_secs(1)).await;
        let (second, _) = state.open_session(Assistant::Guide);
        tokio::time::advance(Duration::from_secs(1)).await;
        let (third, _) = state.open_session(Assistant::Guide);

        assert_eq!(state.sessions.len(), 2);
        assert!(!state.sessions.contains_key(&first));
        assert!(state.sessions.contains_key(&second));
        assert!(state.sessions.contains_key(&third));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper_expires_sessions() {
        let state = state(8, 100);
        let (id, _) = state.open_session(Assistant::Guide);
        let sweeper = state.spawn_session_sweeper();

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(!state.sessions.contains_key(&id));
        sweeper.abort();
    }
}
