//! State-change events carried on the push stream.

use core::fmt;

use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which part of the device state an event describes.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new kinds in
/// future versions without breaking downstream code. Kinds the client
/// does not recognize decode as [`EventKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum EventKind {
    /// Bolt position changed.
    LockState,
    /// Door contact changed.
    DoorState,
    /// Battery level changed.
    Battery,
    /// Doorbell started or stopped ringing.
    Doorbell,
    /// Stream/device connectivity changed.
    Connection,
    /// Unrecognized kind, preserved for forward compatibility.
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

impl EventKind {
    /// Wire/display name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LockState => "lock_state",
            EventKind::DoorState => "door_state",
            EventKind::Battery => "battery",
            EventKind::Doorbell => "doorbell",
            EventKind::Connection => "connection",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_source() -> String {
    "ble".to_string()
}

/// One observed state transition.
///
/// Immutable once created; corrections arrive as new events, never as
/// patches to history. The value strings' semantics depend on
/// [`event_type`](Self::event_type) (e.g. "locked"/"unlocked" for lock
/// events, a percentage for battery events).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimelineEvent {
    /// When the transition was observed by the monitor.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Which part of the state changed.
    pub event_type: EventKind,
    /// Value before the transition.
    pub old_value: String,
    /// Value after the transition.
    pub new_value: String,
    /// Origin of the change, e.g. "ble", "poll", "system".
    #[cfg_attr(feature = "serde", serde(default = "default_source"))]
    pub source: String,
}
