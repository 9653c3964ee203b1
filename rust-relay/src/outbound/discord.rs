//! Discord webhook notifications.
//!
//! Notifications are best-effort: callers log a `NotifyError` and carry on.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::event::PurchaseSummary;
use crate::Config;

const EMBED_TITLE: &str = "🎉 New Purchase!";
const EMBED_COLOR: u32 = 0x00ff00;
const EMBED_FOOTER: &str = "Sellauth Purchase Logger";
const LICENSE_NOTE: &str = "Key generated via Junkie";
const STARTUP_MESSAGE: &str = "🟢 Webhook Server Online ✅";

/// Failure to deliver a Discord message.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Discord webhook URL is not configured")]
    NotConfigured,

    #[error("Discord request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Discord responded with status {status}")]
    Status { status: u16, body: String },
}

// Discord webhook URLs embed their token.
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Request(e.without_url())
    }
}

/// Discord webhook execute body.
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Build the purchase embed for a payload at time `now`.
pub fn build_purchase_message(payload: &Value, now: DateTime<Utc>) -> DiscordMessage {
    let summary = PurchaseSummary::from_payload(payload);

    let fields = vec![
        EmbedField::new("📦 Product", summary.product, true),
        EmbedField::new("💰 Amount", format!("${}", summary.amount), true),
        EmbedField::new("🆔 Order ID", summary.order_id, true),
        EmbedField::new("👤 Customer Email", summary.customer_email, false),
        EmbedField::new("🔑 License System", LICENSE_NOTE, false),
        EmbedField::new(
            "📅 Purchase Date",
            now.format("%-m/%-d/%Y, %-I:%M:%S %p UTC").to_string(),
            false,
        ),
    ];

    DiscordMessage {
        content: None,
        embeds: vec![Embed {
            title: EMBED_TITLE.to_string(),
            color: EMBED_COLOR,
            fields,
            footer: EmbedFooter {
                text: EMBED_FOOTER.to_string(),
            },
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }],
    }
}

/// POST a message to the configured Discord webhook and return the status.
async fn post_message(
    client: &Client,
    config: &Config,
    message: &DiscordMessage,
) -> Result<u16, NotifyError> {
    let url = config
        .discord_webhook_url
        .as_deref()
        .ok_or(NotifyError::NotConfigured)?;

    let response = client
        .post(url)
        .timeout(config.request_timeout())
        .json(message)
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NotifyError::Status { status, body });
    }

    Ok(status)
}

/// Send a purchase summary for `payload` to Discord.
pub async fn send_purchase_notification(
    client: &Client,
    config: &Config,
    payload: &Value,
) -> Result<(), NotifyError> {
    let message = build_purchase_message(payload, Utc::now());

    let status = post_message(client, config, &message).await?;

    info!(status_code = status, "discord_notification_sent");

    Ok(())
}

/// Announce that the server is online.
pub async fn send_startup_notification(
    client: &Client,
    config: &Config,
) -> Result<(), NotifyError> {
    info!("discord_startup_notification_starting");

    let message = DiscordMessage {
        content: Some(STARTUP_MESSAGE.to_string()),
        embeds: Vec::new(),
    };

    match post_message(client, config, &message).await {
        Ok(status) => {
            info!(status_code = status, "discord_startup_notification_sent");
            Ok(())
        }
        Err(e) => {
            if let NotifyError::Status { status, body } = &e {
                warn!(status_code = *status, response_body = %body, "discord_startup_rejected");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 15, 6, 7).unwrap()
    }

    #[test]
    fn test_build_purchase_message_fields() {
        let payload = json!({
            "event": "order.paid",
            "product_name": "Pro License",
            "total": "19.99",
            "order_id": "ord_42",
            "customer_email": "buyer@example.com"
        });

        let message = serde_json::to_value(build_purchase_message(&payload, fixed_now())).unwrap();
        let embed = &message["embeds"][0];

        assert!(message.get("content").is_none());
        assert_eq!(embed["title"], "🎉 New Purchase!");
        assert_eq!(embed["color"], 65280);
        assert_eq!(embed["footer"]["text"], "Sellauth Purchase Logger");
        assert_eq!(embed["timestamp"], "2026-03-04T15:06:07.000Z");

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0]["value"], "Pro License");
        assert_eq!(fields[0]["inline"], true);
        assert_eq!(fields[1]["value"], "$19.99");
        assert_eq!(fields[2]["value"], "ord_42");
        assert_eq!(fields[3]["value"], "buyer@example.com");
        assert_eq!(fields[3]["inline"], false);
        assert_eq!(fields[4]["value"], "Key generated via Junkie");
        assert_eq!(fields[5]["value"], "3/4/2026, 3:06:07 PM UTC");
    }

    #[test]
    fn test_build_purchase_message_placeholders() {
        let message = serde_json::to_value(build_purchase_message(&json!({}), fixed_now())).unwrap();
        let fields = message["embeds"][0]["fields"].as_array().unwrap();

        assert_eq!(fields[0]["value"], "N/A");
        assert_eq!(fields[1]["value"], "$0.00");
        assert_eq!(fields[2]["value"], "N/A");
        assert_eq!(fields[3]["value"], "N/A");
    }

    #[tokio::test]
    async fn test_notification_without_url_is_not_configured() {
        let client = Client::new();
        let config = Config::default();

        let result = send_purchase_notification(&client, &config, &json!({})).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));

        let result = send_startup_notification(&client, &config).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_transport_error_hides_webhook_token() {
        let client = Client::new();
        let config = Config {
            discord_webhook_url: Some(
                "http://127.0.0.1:9/api/webhooks/123/SECRET-WEBHOOK-TOKEN".to_string(),
            ),
            ..Config::default()
        };

        let err = send_purchase_notification(&client, &config, &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Request(_)));
        assert!(!err.to_string().contains("SECRET-WEBHOOK-TOKEN"));
    }
}
