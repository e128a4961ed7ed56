//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression,
//! and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use krishi_core::config::KrishiConfig;
use krishi_core::error::KrishiError;

use crate::handlers;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Allowed browser origins: the server's own port and port+1 for a dev server.
fn allowed_origins(port: u16) -> Vec<HeaderValue> {
    let dev_port = port.saturating_add(1);
    [port, dev_port]
        .iter()
        .flat_map(|p| [format!("http://127.0.0.1:{}", p), format!("http://localhost:{}", p)])
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect()
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(state.config.general.port)))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let chat_routes = Router::new()
        .route("/chat/message", post(handlers::post_message))
        .route("/chat/history", get(handlers::get_history))
        .route("/chat/prompts", get(handlers::get_prompts))
        .route("/chat/reset", post(handlers::reset))
        .route("/chat/stream", get(handlers::stream));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/locale",
            get(handlers::get_locale).put(handlers::put_locale),
        )
        .merge(chat_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured port.
///
/// Binds to 127.0.0.1 (localhost only) and serves until Ctrl-C.
pub async fn start_server(config: &KrishiConfig, state: AppState) -> Result<(), KrishiError> {
    let addr = format!("127.0.0.1:{}", config.general.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KrishiError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| KrishiError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
