//! Push-stream message decoding.
//!
//! Every inbound frame is a complete JSON object with a `type`
//! discriminator. Unknown discriminators decode to
//! [`StreamMessage::Unknown`] and are ignored by the client, so new
//! server-side message kinds never break old clients.

use serde::Deserialize;

use latchview_types::{StatePatch, TimelineEvent};

use crate::error::Result;

/// A decoded push-stream message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Full resync sent once per connection epoch, immediately after
    /// open. Carries the current state and the recent event history
    /// (oldest-first).
    InitialState {
        #[serde(default)]
        state: StatePatch,
        #[serde(default)]
        events: Vec<TimelineEvent>,
    },
    /// Incremental update: a partial state snapshot plus, when the
    /// change produced a history entry, the event describing it.
    StateUpdate {
        #[serde(default)]
        state: StatePatch,
        #[serde(default)]
        event: Option<TimelineEvent>,
    },
    /// Any other `type` value; ignored without error.
    #[serde(other)]
    Unknown,
}

/// Decode one text frame into a [`StreamMessage`].
pub fn decode(frame: &str) -> Result<StreamMessage> {
    Ok(serde_json::from_str(frame)?)
}
