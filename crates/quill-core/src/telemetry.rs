use crate::models::Snippet;
use serde_json::{json, Value};
use tracing::debug;

pub const REPLACEMENT_EVENT: &str = "snippet-replacement";

/// Fire-and-forget usage reporting. No response is expected and failures
/// are invisible to the engine.
pub trait TelemetrySink: Send + Sync {
    fn report(&self, event: &str, payload: Value);
}

/// Payload for a replacement event.
///
/// Deliberately limited to the user identifier, whether a pattern trigger
/// was used, and the snippet kind; never the trigger or replacement text.
pub fn replacement_payload(user: &str, snippet: &Snippet) -> Value {
    json!({
        "user": user,
        "regex": snippet.regex,
        "type": snippet.body.type_name(),
    })
}

/// Default sink: a structured log line, no network.
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn report(&self, event: &str, payload: Value) {
        debug!(event, %payload, "telemetry");
    }
}
