//! Inbound Sellauth event handling.
//!
//! Payloads are kept as untyped `serde_json::Value`s: Sellauth's schema is
//! not enforced, and the only thing this crate routes on is the `event` field.
//! Display fields fall back through alternate keys to a placeholder.

use serde_json::Value;

/// Event names that trigger key generation and a purchase notification.
pub const PURCHASE_EVENTS: &[&str] = &["order.created", "order.paid"];

/// Placeholder shown when a field is missing from the payload.
pub const PLACEHOLDER: &str = "N/A";

/// Amount shown when neither `total` nor `amount` is present.
pub const DEFAULT_AMOUNT: &str = "0.00";

/// Routing decision for an inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A created or paid order
    Purchase,
    /// Anything else, including a missing `event`
    Ignored,
}

/// Classification result, carrying the original label for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub kind: EventKind,
    pub label: Option<&'a str>,
}

impl Classification<'_> {
    pub fn is_purchase(&self) -> bool {
        self.kind == EventKind::Purchase
    }
}

/// Classify a payload by its `event` field.
pub fn classify(payload: &Value) -> Classification<'_> {
    let label = payload.get("event").and_then(Value::as_str);

    let kind = match label {
        Some(event) if PURCHASE_EVENTS.contains(&event) => EventKind::Purchase,
        _ => EventKind::Ignored,
    };

    Classification { kind, label }
}

/// Render a scalar as display text.
///
/// Empty strings, zero, null and non-scalars count as absent so the caller
/// can fall through to the next candidate. Integral floats drop their
/// fraction, so `10.0` reads as `10`.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => None,
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", f as i64))
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Resolve the first present value among several JSON pointers.
fn resolve(payload: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| payload.pointer(p))
        .find_map(display_value)
}

/// Human-readable summary of a purchase, used by the Discord notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSummary {
    pub product: String,
    pub amount: String,
    pub order_id: String,
    pub customer_email: String,
}

impl PurchaseSummary {
    /// Extract display fields, preferring top-level keys over alternates.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            product: resolve(payload, &["/product_name", "/product/name"])
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            amount: resolve(payload, &["/total", "/amount"])
                .unwrap_or_else(|| DEFAULT_AMOUNT.to_string()),
            order_id: resolve(payload, &["/order_id", "/id"])
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            customer_email: resolve(payload, &["/customer_email", "/email"])
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}
