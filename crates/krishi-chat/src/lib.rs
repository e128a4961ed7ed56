//! Conversational assistant for Krishi.
//!
//! Classifies free-text farming questions against a per-language keyword
//! catalog, answers them after a simulated delay, and keeps an ordered,
//! append-only conversation history.

pub mod engine;
pub mod error;
pub mod history;
pub mod locale;
pub mod matcher;
pub mod rules;
pub mod scheduler;

pub use engine::{ConversationEngine, ConversationSnapshot};
pub use error::ChatError;
pub use history::ConversationHistory;
pub use locale::LanguageSelector;
pub use matcher::{Classification, IntentMatcher, Responder};
pub use rules::{IntentRule, RuleCatalog, RuleTable};
pub use scheduler::{DelayFn, Latency, ResponseScheduler};
