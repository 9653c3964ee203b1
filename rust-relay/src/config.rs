//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup and handed to the web layer inside
//! `AppState`, so handlers never touch the environment themselves.

use std::env;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Discord webhook that receives purchase summaries and the startup ping
    pub discord_webhook_url: Option<String>,

    /// Shared secret Sellauth uses to sign inbound webhooks
    pub sellauth_hmac_secret: Option<String>,

    /// Key generation service that receives every purchase event
    pub keygen_webhook_url: Option<String>,

    /// Shared secret used to sign payloads forwarded to key generation
    pub keygen_hmac_secret: Option<String>,

    /// Reject webhooks that carry no `X-Signature` header
    pub require_signature: bool,

    /// Verify signatures over the raw request body instead of the
    /// re-serialized JSON payload
    pub sign_raw_body: bool,

    /// Timeout applied to each outbound request, in milliseconds
    pub request_timeout_ms: u64,

    /// Post an "online" message to Discord once the server is listening
    pub startup_notification: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            discord_webhook_url: None,
            sellauth_hmac_secret: None,
            keygen_webhook_url: None,
            keygen_hmac_secret: None,
            require_signature: false,
            sign_raw_body: false,
            request_timeout_ms: 10_000,
            startup_notification: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_number("PORT", defaults.port),

            discord_webhook_url: parse_optional("DISCORD_WEBHOOK_URL"),

            sellauth_hmac_secret: parse_optional("SELLAUTH_HMAC_SECRET"),

            keygen_webhook_url: parse_optional("KEYGEN_WEBHOOK_URL"),

            keygen_hmac_secret: parse_optional("KEYGEN_HMAC_SECRET"),

            require_signature: parse_bool("REQUIRE_SIGNATURE", defaults.require_signature),

            sign_raw_body: parse_bool("SIGN_RAW_BODY", defaults.sign_raw_body),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),

            startup_notification: parse_bool(
                "STARTUP_NOTIFICATION",
                defaults.startup_notification,
            ),
        }
    }

    /// Outbound request timeout as a `Duration`.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

/// Read an optional string, treating blank values as unset.
fn parse_optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_number<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

/// Parse a boolean flag such as "true", "0" or "yes".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_valid() {
        env::set_var("TEST_RELAY_PORT", "8081");
        assert_eq!(parse_number::<u16>("TEST_RELAY_PORT", 3000), 8081);
        env::remove_var("TEST_RELAY_PORT");
    }

    #[test]
    fn test_parse_number_invalid_uses_default() {
        env::set_var("TEST_RELAY_TIMEOUT", "soon");
        assert_eq!(parse_number::<u64>("TEST_RELAY_TIMEOUT", 10_000), 10_000);
        env::remove_var("TEST_RELAY_TIMEOUT");
    }

    #[test]
    fn test_parse_bool() {
        env::set_var("TEST_RELAY_FLAG_ON", "Yes");
        env::set_var("TEST_RELAY_FLAG_OFF", "0");
        env::set_var("TEST_RELAY_FLAG_BAD", "maybe");
        assert!(parse_bool("TEST_RELAY_FLAG_ON", false));
        assert!(!parse_bool("TEST_RELAY_FLAG_OFF", true));
        assert!(parse_bool("TEST_RELAY_FLAG_BAD", true));
        assert!(!parse_bool("TEST_RELAY_FLAG_UNSET", false));
        env::remove_var("TEST_RELAY_FLAG_ON");
        env::remove_var("TEST_RELAY_FLAG_OFF");
        env::remove_var("TEST_RELAY_FLAG_BAD");
    }

    #[test]
    fn test_parse_optional_blank_is_none() {
        env::set_var("TEST_RELAY_SECRET", "   ");
        assert_eq!(parse_optional("TEST_RELAY_SECRET"), None);
        env::set_var("TEST_RELAY_SECRET", " abc ");
        assert_eq!(parse_optional("TEST_RELAY_SECRET"), Some("abc".to_string()));
        env::remove_var("TEST_RELAY_SECRET");
    }

    #[test]
    fn test_default_matches_observed_behavior() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(!config.require_signature);
        assert!(!config.sign_raw_body);
        assert_eq!(config.request_timeout(), std::time::Duration::from_secs(10));
    }
}
