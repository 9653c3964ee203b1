//! Outbound calls to the two downstream collaborators.
//!
//! - `keygen`: signed forward of purchase events to the key generation service
//! - `discord`: best-effort purchase and startup notifications
//!
//! Both share the `reqwest::Client` held in `AppState` and apply the
//! configured per-request timeout.

pub mod discord;
pub mod keygen;

pub use discord::{
    build_purchase_message, send_purchase_notification, send_startup_notification,
    DiscordMessage, NotifyError,
};
pub use keygen::{forward_to_keygen, ForwardError};
