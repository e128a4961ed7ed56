//! Conversation engine: owns the history and answers messages in order.
//!
//! `submit` appends the user message and queues it; a single worker task per
//! engine drains the queue one entry at a time (delay, classify, append), so
//! replies land in submission order regardless of individual latency.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use uuid::Uuid;

use krishi_core::config::ChatConfig;
use krishi_core::events::ConversationEvent;
use krishi_core::types::{Locale, Message, MessageId};

use crate::error::ChatError;
use crate::history::ConversationHistory;
use crate::locale::LanguageSelector;
use crate::matcher::{IntentMatcher, Responder};
use crate::scheduler::ResponseScheduler;

/// Capacity of the per-engine event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Consistent view of a conversation at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
    pub awaiting_response: bool,
    pub locale: Locale,
}

/// A submission waiting for its reply.
#[derive(Debug)]
struct PendingReply {
    message_id: MessageId,
    /// Trimmed input handed to the responder.
    text: String,
    /// Locale active when the message was submitted.
    locale: Locale,
}

#[derive(Debug, Default)]
struct EngineState {
    history: ConversationHistory,
    in_flight: usize,
}

struct EngineShared {
    session_id: Uuid,
    state: Mutex<EngineState>,
    matcher: Arc<IntentMatcher>,
    responder: Arc<dyn Responder>,
    scheduler: ResponseScheduler,
    language: LanguageSelector,
    events: broadcast::Sender<ConversationEvent>,
    awaiting: watch::Sender<bool>,
}

impl EngineShared {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ConversationEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn mark_in_flight(&self, state: &mut EngineState) {
        state.in_flight += 1;
        if state.in_flight == 1 {
            self.awaiting.send_replace(true);
            self.emit(ConversationEvent::ResponderChanged {
                session_id: self.session_id,
                awaiting_response: true,
            });
        }
    }

    /// Append the reply to `reply_to` and release its in-flight slot.
    fn complete(&self, reply_to: MessageId, text: &str) {
        let mut state = self.lock_state();
        let message = state.history.push_assistant(text, Some(reply_to));
        state.in_flight = state.in_flight.saturating_sub(1);

        self.emit(ConversationEvent::MessageAppended {
            session_id: self.session_id,
            message,
        });
        if state.in_flight == 0 {
            self.awaiting.send_replace(false);
            self.emit(ConversationEvent::ResponderChanged {
                session_id: self.session_id,
                awaiting_response: false,
            });
        }
    }
}

/// One conversation: history, active locale, and the reply worker.
///
/// Must be created inside a Tokio runtime. Dropping the engine closes the
/// queue; the worker answers what is already queued and then exits.
pub struct ConversationEngine {
    shared: Arc<EngineShared>,
    queue: mpsc::UnboundedSender<PendingReply>,
    _shutdown: oneshot::Sender<()>,
}

impl ConversationEngine {
    /// Engine answering with `matcher` itself.
    pub fn new(
        matcher: Arc<IntentMatcher>,
        scheduler: ResponseScheduler,
        language: LanguageSelector,
    ) -> Self {
        let responder: Arc<dyn Responder> = matcher.clone();
        Self::with_responder(matcher, scheduler, language, responder)
    }

    /// Engine with a custom reply source. `matcher` still supplies fallback,
    /// welcome, and prompt texts.
    pub fn with_responder(
        matcher: Arc<IntentMatcher>,
        scheduler: ResponseScheduler,
        language: LanguageSelector,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (awaiting, _) = watch::channel(false);
        let shared = Arc::new(EngineShared {
            session_id: Uuid::new_v4(),
            state: Mutex::new(EngineState::default()),
            matcher,
            responder,
            scheduler,
            language,
            events,
            awaiting,
        });

        let (queue, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let locales = shared.language.subscribe();

        tokio::spawn(run_worker(shared.clone(), rx));
        tokio::spawn(forward_locale_changes(shared.clone(), locales, shutdown_rx));

        tracing::info!(
            session_id = %shared.session_id,
            locale = %shared.language.get(),
            "Conversation started"
        );

        Self {
            shared,
            queue,
            _shutdown: shutdown_tx,
        }
    }

    /// Engine configured from the `[chat]` section, starting in `locale`.
    /// Seeds the welcome message when `chat.seed_welcome` is set.
    pub fn start(
        matcher: Arc<IntentMatcher>,
        chat: &ChatConfig,
        locale: Locale,
    ) -> Result<Self, ChatError> {
        let engine = Self::new(
            matcher,
            ResponseScheduler::from_config(chat),
            LanguageSelector::new(locale),
        );
        if chat.seed_welcome {
            engine.seed_default()?;
        }
        Ok(engine)
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    /// Accept one user message.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the raw text is
    /// appended as a user message, the reply is queued with the locale active
    /// right now, and the appended message is returned.
    pub fn submit(&self, raw_text: &str) -> Option<Message> {
        self.enqueue(raw_text, None)
    }

    /// Like [`submit`](Self::submit), but switch to `locale` first and answer
    /// in it. The switch and the enqueue happen under one lock, so a
    /// concurrent `set_locale` cannot change which table answers.
    ///
    /// Blank input is ignored and leaves the locale untouched.
    pub fn submit_in(&self, raw_text: &str, locale: Locale) -> Option<Message> {
        self.enqueue(raw_text, Some(locale))
    }

    fn enqueue(&self, raw_text: &str, switch_to: Option<Locale>) -> Option<Message> {
        let text = raw_text.trim();
        if text.is_empty() {
            tracing::debug!(session_id = %self.shared.session_id, "Ignoring empty input");
            return None;
        }

        let mut state = self.shared.lock_state();
        let locale = match switch_to {
            Some(locale) => {
                if self.shared.language.set(locale) {
                    tracing::info!(session_id = %self.shared.session_id, locale = %locale, "Locale switched");
                }
                locale
            }
            None => self.shared.language.get(),
        };

        let message = state.history.push_user(raw_text);
        self.shared.emit(ConversationEvent::MessageAppended {
            session_id: self.shared.session_id,
            message: message.clone(),
        });
        self.shared.mark_in_flight(&mut state);

        let pending = PendingReply {
            message_id: message.id,
            text: text.to_string(),
            locale,
        };

        // Sent under the lock so queue order matches history order.
        if self.queue.send(pending).is_err() {
            tracing::error!(
                session_id = %self.shared.session_id,
                "Reply worker is gone, answering with fallback"
            );
            drop(state);
            self.shared
                .complete(message.id, self.shared.matcher.fallback(locale));
            return Some(message);
        }

        tracing::debug!(
            session_id = %self.shared.session_id,
            message_id = %message.id,
            locale = %locale,
            "Message submitted"
        );
        Some(message)
    }

    /// Push the initial assistant message and switch to `locale`.
    ///
    /// Only valid on an empty conversation.
    pub fn seed(&self, welcome_text: &str, locale: Locale) -> Result<Message, ChatError> {
        if welcome_text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let mut state = self.shared.lock_state();
        if !state.history.is_empty() {
            return Err(ChatError::SeedAfterStart);
        }

        self.shared.language.set(locale);
        let message = state.history.push_assistant(welcome_text, None);
        self.shared.emit(ConversationEvent::MessageAppended {
            session_id: self.shared.session_id,
            message: message.clone(),
        });
        Ok(message)
    }

    /// Seed the catalog's welcome text for the active locale.
    pub fn seed_default(&self) -> Result<Message, ChatError> {
        let locale = self.locale();
        let welcome = self.shared.matcher.welcome(locale).to_string();
        self.seed(&welcome, locale)
    }

    /// Copy of the full history, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.shared.lock_state().history.messages().to_vec()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.shared.lock_state();
        ConversationSnapshot {
            session_id: self.shared.session_id,
            messages: state.history.messages().to_vec(),
            awaiting_response: state.in_flight > 0,
            locale: self.shared.language.get(),
        }
    }

    /// True while at least one submitted message has no reply yet.
    pub fn is_awaiting_response(&self) -> bool {
        self.shared.lock_state().in_flight > 0
    }

    /// Resolve once every submitted message has been answered.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.awaiting.subscribe();
        loop {
            if !*rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.shared.events.subscribe()
    }

    /// Switch the active locale for later submissions. Returns `true` if it
    /// changed.
    pub fn set_locale(&self, locale: Locale) -> bool {
        let changed = self.shared.language.set(locale);
        if changed {
            tracing::info!(session_id = %self.shared.session_id, locale = %locale, "Locale switched");
        }
        changed
    }

    pub fn locale(&self) -> Locale {
        self.shared.language.get()
    }

    /// Quick questions for the active locale.
    pub fn suggested_prompts(&self) -> Vec<String> {
        self.shared.matcher.suggested_prompts(self.locale()).to_vec()
    }

    /// Input placeholder text for the active locale.
    pub fn placeholder(&self) -> String {
        self.shared.matcher.placeholder(self.locale()).to_string()
    }
}

async fn run_worker(shared: Arc<EngineShared>, mut queue: mpsc::UnboundedReceiver<PendingReply>) {
    while let Some(pending) = queue.recv().await {
        let fallback = shared.matcher.fallback(pending.locale);
        let work = shared.responder.respond(&pending.text, pending.locale);
        let reply = shared.scheduler.schedule(work, fallback).await;
        shared.complete(pending.message_id, &reply);
    }
    tracing::info!(session_id = %shared.session_id, "Conversation worker stopped");
}

async fn forward_locale_changes(
    shared: Arc<EngineShared>,
    mut locales: watch::Receiver<Locale>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            changed = locales.changed() => {
                if changed.is_err() {
                    break;
                }
                let locale = *locales.borrow_and_update();
                shared.emit(ConversationEvent::LocaleChanged {
                    session_id: shared.session_id,
                    locale,
                });
            }
            _ = &mut shutdown => break,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
