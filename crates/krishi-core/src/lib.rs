pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::KrishiConfig;
pub use error::{KrishiError, Result};
pub use events::ConversationEvent;
pub use types::*;
