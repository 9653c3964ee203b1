//! Sellauth relay - purchase webhook verification and fan-out.
//!
//! Receives Sellauth purchase webhooks, checks their HMAC signature, and
//! relays purchase events to a key generation service and a Discord channel.
//!
//! ## Flow
//!
//! ```text
//! Sellauth → /webhook/sellauth → verify → classify → keygen forward → Discord
//! ```

pub mod config;
pub mod event;
pub mod outbound;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use event::{classify, Classification, EventKind, PurchaseSummary};
pub use outbound::{ForwardError, NotifyError};
pub use web::{router, AppState};
