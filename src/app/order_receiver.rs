//! Order intake. Orders are logged and acknowledged; nothing is stored.

use serde_json::Value as JsonValue;

/// Logs `order` pretty-printed at info level.
pub fn receive_order(order: &JsonValue) {
    let pretty = serde_json::to_string_pretty(order).unwrap_or_else(|_| order.to_string());
    tracing::info!("new order received:\n{}", pretty);
}
