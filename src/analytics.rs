//! Analytics consumer for [`UrlEvent`] payloads.
//!
//! Turns the event stream into metrics:
//!
//! - `url_add` records the source URL length in the `url_length` histogram
//! - `url_access` increments the `url_requests_total` counter

use crate::domain::UrlEvent;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to a single payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Recorded(&'static str),
    /// Well-formed JSON with an event type this consumer does not track.
    Ignored,
    Malformed,
}

/// Decodes one payload and records its metrics.
pub fn handle_payload(payload: &[u8]) -> Outcome {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, size = payload.len(), "Failed to parse event");
            return Outcome::Malformed;
        }
    };

    match value.get("type").and_then(Value::as_str) {
        Some("url_add" | "url_access") => {}
        other => {
            debug!(event_type = ?other, "Ignoring event");
            return Outcome::Ignored;
        }
    }

    let event: UrlEvent = match serde_json::from_value(value) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Failed to parse event");
            return Outcome::Malformed;
        }
    };

    match &event {
        UrlEvent::Added { source, .. } => {
            metrics::histogram!("url_length").record(source.len() as f64);
        }
        UrlEvent::Accessed { .. } => {
            metrics::counter!("url_requests_total").increment(1);
        }
    }

    info!(event_type = event.kind(), alias = event.alias(), "Parsed event");
    Outcome::Recorded(event.kind())
}

/// Drains `messages` until it closes or `cancel` fires.
pub async fn run(mut messages: mpsc::Receiver<Vec<u8>>, cancel: CancellationToken) {
    loop {
        let payload = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            payload = messages.recv() => match payload {
                Some(payload) => payload,
                None => break,
            },
        };

        handle_payload(&payload);
    }

    info!("Shutting down message processing");
}
