//! HTTP routing.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::web::handlers::{health, sellauth_webhook, AppState};

/// Path Sellauth posts purchase events to.
pub const WEBHOOK_PATH: &str = "/webhook/sellauth";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(WEBHOOK_PATH, post(sellauth_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
