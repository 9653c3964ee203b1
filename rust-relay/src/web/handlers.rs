//! Webhook endpoint handlers.
//!
//! The Sellauth handler runs one linear pipeline per request:
//! 1. Verify `X-Signature` when present (or when required)
//! 2. Classify the event
//! 3. Forward purchases to key generation, aborting on failure
//! 4. Notify Discord, logging but never surfacing failures

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::event::classify;
use crate::outbound::{forward_to_keygen, send_purchase_notification};
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Client,
}

impl AppState {
    /// Build state with a pooled HTTP client for outbound calls.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

// =============================================================================
// Sellauth Webhook
// =============================================================================

/// Acknowledgement for an accepted webhook.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Body returned for rejected or failed webhooks.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn reject(status: StatusCode, error: &'static str, message: Option<String>) -> Response {
    (status, Json(ErrorResponse { error, message })).into_response()
}

fn accept(message: &'static str) -> Response {
    (
        StatusCode::OK,
        Json(WebhookResponse {
            success: true,
            message,
        }),
    )
        .into_response()
}

/// Outcome of checking the inbound signature.
#[derive(Debug, PartialEq, Eq)]
enum SignatureCheck {
    Verified,
    Unsigned,
    Missing,
    Invalid,
}

fn check_signature(
    config: &Config,
    headers: &HeaderMap,
    raw_body: &[u8],
    payload: &Value,
) -> Result<SignatureCheck, serde_json::Error> {
    // An empty header counts as absent. Anything else, including bytes that
    // are not valid UTF-8, is a claimed signature and must match.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(HeaderValue::as_bytes)
        .filter(|b| !b.is_empty());

    let signature = match signature {
        Some(sig) => sig,
        None if config.require_signature => return Ok(SignatureCheck::Missing),
        None => return Ok(SignatureCheck::Unsigned),
    };

    let secret = match config.sellauth_hmac_secret.as_deref() {
        Some(secret) => secret,
        None => {
            warn!("sellauth_secret_not_configured");
            return Ok(SignatureCheck::Invalid);
        }
    };

    let valid = if config.sign_raw_body {
        verify_signature(secret, raw_body, signature)
    } else {
        let reencoded = serde_json::to_vec(payload)?;
        verify_signature(secret, &reencoded, signature)
    };

    Ok(if valid {
        SignatureCheck::Verified
    } else {
        SignatureCheck::Invalid
    })
}

/// Sellauth webhook endpoint.
pub async fn sellauth_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(body_length = body.len(), "webhook_received");

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "webhook_invalid_json");
            return reject(StatusCode::BAD_REQUEST, "Invalid JSON payload", None);
        }
    };

    debug!(payload = %payload, "webhook_payload");

    match check_signature(&state.config, &headers, &body, &payload) {
        Ok(SignatureCheck::Verified) => info!("signature_verified"),
        Ok(SignatureCheck::Unsigned) => warn!("signature_missing"),
        Ok(SignatureCheck::Missing) => {
            warn!("signature_required_but_missing");
            return reject(StatusCode::UNAUTHORIZED, "Missing signature", None);
        }
        Ok(SignatureCheck::Invalid) => {
            error!("signature_invalid");
            return reject(StatusCode::UNAUTHORIZED, "Invalid signature", None);
        }
        Err(e) => {
            error!(error = %e, "signature_check_failed");
            return reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(e.to_string()),
            );
        }
    }

    let classification = classify(&payload);

    if !classification.is_purchase() {
        info!(event = ?classification.label, "event_ignored");
        return accept("Event ignored");
    }

    info!(event = ?classification.label, "purchase_event_detected");

    if let Err(e) = forward_to_keygen(&state.client, &state.config, &payload).await {
        error!(error = %e, "keygen_forward_failed");
        return reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(e.to_string()),
        );
    }

    if let Err(e) = send_purchase_notification(&state.client, &state.config, &payload).await {
        warn!(error = %e, "discord_notification_failed");
    }

    info!(event = ?classification.label, "webhook_processed");

    accept("Webhook processed successfully")
}
