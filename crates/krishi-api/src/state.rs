//! Application state shared across all route handlers.
//!
//! Holds the configuration, the shared intent matcher, and the current
//! conversation. Resetting replaces the conversation with a fresh one.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use krishi_chat::{ChatError, ConversationEngine, IntentMatcher};
use krishi_core::config::KrishiConfig;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<KrishiConfig>,
    /// Rule catalog shared by every conversation.
    pub matcher: Arc<IntentMatcher>,
    /// The active conversation.
    session: Arc<RwLock<Arc<ConversationEngine>>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build state from config, loading the rule catalog it names.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: KrishiConfig) -> Result<Self, ChatError> {
        let matcher = IntentMatcher::from_config(&config.chat)?;
        Self::with_matcher(config, matcher)
    }

    /// Build state around an already constructed matcher.
    pub fn with_matcher(config: KrishiConfig, matcher: IntentMatcher) -> Result<Self, ChatError> {
        let matcher = Arc::new(matcher);
        let engine =
            ConversationEngine::start(matcher.clone(), &config.chat, config.general.default_locale)?;
        Ok(Self {
            config: Arc::new(config),
            matcher,
            session: Arc::new(RwLock::new(Arc::new(engine))),
            start_time: Instant::now(),
        })
    }

    /// The active conversation.
    pub fn engine(&self) -> Arc<ConversationEngine> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the conversation with a fresh one in the current locale.
    ///
    /// Replies still queued on the old conversation are answered there and
    /// discarded with it.
    pub fn reset_session(&self) -> Result<Arc<ConversationEngine>, ChatError> {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        let locale = session.locale();
        let engine = Arc::new(ConversationEngine::start(
            self.matcher.clone(),
            &self.config.chat,
            locale,
        )?);
        tracing::info!(
            old_session = %session.session_id(),
            new_session = %engine.session_id(),
            "Conversation reset"
        );
        *session = engine.clone();
        Ok(engine)
    }
}
