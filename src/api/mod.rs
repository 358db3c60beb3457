//! API module
//!
//! Thin HTTP handlers over the chat service. Authentication happens
//! upstream; handlers trust the caller id in `X-User-Id`.

pub mod chat;
pub mod utils;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use utils::RouterState;

/// Health check body, including completion pool saturation
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" when the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Completion calls currently running
    pub ai_workers_in_flight: usize,
    /// Completion pool capacity
    pub ai_workers_capacity: usize,
}

/// Build the router for every chat endpoint
pub fn create_router(state: RouterState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/chat/sessions",
            get(chat::list_sessions).post(chat::create_session),
        )
        .route("/api/chat/sessions/:id", delete(chat::delete_session))
        .route(
            "/api/chat/sessions/:id/messages",
            get(chat::get_session_messages).post(chat::send_message),
        )
        .with_state(state)
}

/// CORS layer admitting only `origins`
///
/// Origins that are not valid header values are logged and skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check(State(chat): State<RouterState>) -> Json<HealthResponse> {
    let pool = chat.adapter().pool();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_workers_in_flight: pool.in_flight(),
        ai_workers_capacity: pool.capacity(),
    })
}
