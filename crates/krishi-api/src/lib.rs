//! Krishi API crate - axum HTTP surface for the conversation engine.
//!
//! Exposes message submission, history, quick prompts, locale switching,
//! session reset, a live SSE event stream, and a health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
