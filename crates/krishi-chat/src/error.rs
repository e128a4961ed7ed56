//! Error types for the conversational assistant.

use krishi_core::error::KrishiError;
use krishi_core::types::Locale;

/// Errors from the chat engine and its rule catalog.
///
/// None of these occur while answering a message: classification always
/// resolves to a response. They surface at construction or on API misuse.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    #[error("invalid rule table for locale '{locale}': {reason}")]
    InvalidRuleTable { locale: Locale, reason: String },
    #[error("conversation already started; seed must precede the first message")]
    SeedAfterStart,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<KrishiError> for ChatError {
    fn from(err: KrishiError) -> Self {
        match err {
            KrishiError::UnsupportedLocale(code) => ChatError::UnsupportedLocale(code),
            other => ChatError::Config(other.to_string()),
        }
    }
}
