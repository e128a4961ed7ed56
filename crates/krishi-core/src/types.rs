use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KrishiError;

// =============================================================================
// Locale
// =============================================================================

/// Conversation language. The set is closed: every table indexed by locale
/// must handle each variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    /// English (primary).
    #[default]
    #[serde(rename = "en")]
    English,
    /// Malayalam (secondary).
    #[serde(rename = "ml")]
    Malayalam,
}

impl Locale {
    /// Every supported locale, primary first.
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Malayalam];

    /// Short language code used on the wire and in config files.
    pub const fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Malayalam => "ml",
        }
    }

    /// Name of the language in its own script.
    pub const fn native_name(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Malayalam => "മലയാളം",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = KrishiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "ml" | "malayalam" => Ok(Locale::Malayalam),
            _ => Err(KrishiError::UnsupportedLocale(s.to_string())),
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Position of a message in its conversation. Ids are issued in append order,
/// so comparing two ids compares their display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Values are never modified after being appended
/// to a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Text as entered (user) or as generated (assistant).
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    /// The user message this reply answers. `None` for user messages and for
    /// the seeded welcome message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<MessageId>,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            created_at: Utc::now(),
            in_reply_to: None,
        }
    }

    pub fn assistant(id: MessageId, text: impl Into<String>, in_reply_to: Option<MessageId>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Assistant,
            created_at: Utc::now(),
            in_reply_to,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

// =============================================================================
// Tests
// =============================================================================
