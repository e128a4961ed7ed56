//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its parameters via axum extractors, works against
//! the active conversation in [`AppState`], and returns JSON.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use krishi_chat::{ChatError, ConversationSnapshot};
use krishi_core::types::Locale;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Request body for POST /chat/message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    /// Switch to this locale before submitting.
    pub locale: Option<String>,
    /// Hold the response until every queued reply has been appended.
    #[serde(default)]
    pub wait: bool,
}

/// Request body for PUT /locale.
#[derive(Debug, Deserialize)]
pub struct LocaleRequest {
    pub locale: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptsParams {
    pub locale: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

/// Response for POST /chat/message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// False when the text was blank and nothing was appended.
    pub accepted: bool,
    #[serde(flatten)]
    pub conversation: ConversationSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptsResponse {
    pub locale: Locale,
    pub prompts: Vec<String>,
    pub placeholder: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocaleResponse {
    pub locale: Locale,
    /// Language name in its own script.
    pub name: String,
    pub supported: Vec<Locale>,
}

impl LocaleResponse {
    fn new(locale: Locale) -> Self {
        Self {
            locale,
            name: locale.native_name().to_string(),
            supported: Locale::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub session_id: Uuid,
    pub message_count: usize,
}

fn parse_locale(code: &str) -> Result<Locale, ApiError> {
    code.parse::<Locale>().map_err(ApiError::from)
}

// =============================================================================
// Chat
// =============================================================================

/// POST /chat/message - submit one user message.
///
/// Blank text is not an error: the response reports `accepted: false` and
/// the conversation is unchanged, including its locale. A `locale` given
/// with accepted text is switched to and used for that message's reply.
pub async fn post_message(
    State(state): State<AppState>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let locale = body.locale.as_deref().map(parse_locale).transpose()?;

    let max_chars = state.config.chat.max_message_chars;
    if body.text.chars().count() > max_chars {
        return Err(ChatError::MessageTooLong(max_chars).into());
    }

    let engine = state.engine();
    let submitted = match locale {
        Some(locale) => engine.submit_in(&body.text, locale),
        None => engine.submit(&body.text),
    };

    let accepted = submitted.is_some();
    if accepted && body.wait {
        engine.wait_idle().await;
    }

    Ok(Json(MessageResponse {
        accepted,
        conversation: engine.snapshot(),
    }))
}

/// GET /chat/history - full conversation snapshot.
pub async fn get_history(State(state): State<AppState>) -> Json<ConversationSnapshot> {
    Json(state.engine().snapshot())
}

/// GET /chat/prompts - quick questions for the active (or requested) locale.
pub async fn get_prompts(
    State(state): State<AppState>,
    Query(params): Query<PromptsParams>,
) -> Result<Json<PromptsResponse>, ApiError> {
    let locale = match params.locale.as_deref() {
        Some(code) => parse_locale(code)?,
        None => state.engine().locale(),
    };

    Ok(Json(PromptsResponse {
        locale,
        prompts: state.matcher.suggested_prompts(locale).to_vec(),
        placeholder: state.matcher.placeholder(locale).to_string(),
    }))
}

/// POST /chat/reset - start a fresh conversation.
pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ConversationSnapshot>, ApiError> {
    let engine = state.reset_session()?;
    Ok(Json(engine.snapshot()))
}

/// GET /chat/stream - SSE stream of conversation events.
///
/// Follows the conversation active when the stream was opened; the stream
/// ends after a reset once that conversation is dropped.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.engine().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event(event.event_name()).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

// =============================================================================
// Locale
// =============================================================================

/// GET /locale - active locale.
pub async fn get_locale(State(state): State<AppState>) -> Json<LocaleResponse> {
    Json(LocaleResponse::new(state.engine().locale()))
}

/// PUT /locale - switch the active locale. Existing messages are untouched.
pub async fn put_locale(
    State(state): State<AppState>,
    Json(body): Json<LocaleRequest>,
) -> Result<Json<LocaleResponse>, ApiError> {
    let locale = parse_locale(&body.locale)?;
    state.engine().set_locale(locale);
    Ok(Json(LocaleResponse::new(locale)))
}

// =============================================================================
// Health
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        session_id: engine.session_id(),
        message_count: engine.history().len(),
    })
}
