//! Web server module for handling inbound Sellauth webhooks.
//!
//! This module provides:
//! - `POST /webhook/sellauth`: verify, classify, forward and notify
//! - `GET /health`: liveness probe with the current timestamp

pub mod handlers;
pub mod router;
pub mod signature;

pub use handlers::{
    health, sellauth_webhook, AppState, ErrorResponse, HealthResponse, WebhookResponse,
};
pub use router::{router, WEBHOOK_PATH};
pub use signature::{compute_signature, is_signing_enabled, verify_signature, SIGNATURE_HEADER};
