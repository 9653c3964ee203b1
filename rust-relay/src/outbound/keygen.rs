//! Key generation forwarding.
//!
//! Purchase payloads are forwarded as compact JSON. When a keygen secret is
//! configured the exact bytes sent are signed with HMAC-SHA256 and the hex
//! digest travels in `X-Signature`; without one the forward goes out unsigned.

use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::web::signature::{compute_signature, SIGNATURE_HEADER};
use crate::Config;

/// Failure to hand a purchase to the key generation service.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("key generation webhook URL is not configured")]
    NotConfigured,

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to sign payload")]
    Signing,

    #[error("key generation request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },
}

// The keygen URL carries a credential, so it never ends up in error text.
impl From<reqwest::Error> for ForwardError {
    fn from(e: reqwest::Error) -> Self {
        ForwardError::Request(e.without_url())
    }
}

/// Forward a purchase payload to the key generation service.
///
/// Returns the service's response body on a 2xx status. Any transport error
/// or non-success status is returned to the caller, which must not notify.
pub async fn forward_to_keygen(
    client: &Client,
    config: &Config,
    payload: &Value,
) -> Result<String, ForwardError> {
    let url = config
        .keygen_webhook_url
        .as_deref()
        .ok_or(ForwardError::NotConfigured)?;

    let body = serde_json::to_vec(payload)?;

    let mut request = client
        .post(url)
        .timeout(config.request_timeout())
        .header(CONTENT_TYPE, "application/json");

    match config.keygen_hmac_secret.as_deref() {
        Some(secret) => {
            let signature =
                compute_signature(secret, &body).map_err(|_| ForwardError::Signing)?;
            request = request.header(SIGNATURE_HEADER, signature);
        }
        _ => warn!("keygen_forward_unsigned"),
    }

    info!(body_length = body.len(), "keygen_forward_starting");

    let response = match request.body(body).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let e = e.without_url();
            if e.is_timeout() {
                error!(
                    timeout_ms = config.request_timeout_ms,
                    error = %e,
                    "keygen_forward_timeout"
                );
            } else {
                error!(error = %e, "keygen_forward_request_error");
            }
            return Err(e.into());
        }
    };

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        error!(
            status_code = status.as_u16(),
            response_body = %text,
            "keygen_forward_rejected"
        );
        return Err(ForwardError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    info!(
        status_code = status.as_u16(),
        response_length = text.len(),
        "keygen_forward_complete"
    );

    Ok(text)
}
