//! Canonical device state and the partial snapshots merged into it.

use core::fmt;

use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bolt position reported by the lock.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new states
/// in future versions without breaking downstream code. Values the
/// client does not recognize decode as [`LockState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum LockState {
    /// Bolt is fully extended.
    Locked,
    /// Bolt is fully retracted.
    Unlocked,
    /// Bolt is currently extending.
    Locking,
    /// Bolt is currently retracting.
    Unlocking,
    /// Bolt failed to reach its target position.
    Jammed,
    /// State has not been observed yet.
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl LockState {
    /// Wire/display name of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Locked => "locked",
            LockState::Unlocked => "unlocked",
            LockState::Locking => "locking",
            LockState::Unlocking => "unlocking",
            LockState::Jammed => "jammed",
            LockState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Door contact sensor state.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new states
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum DoorState {
    /// Door is open.
    Open,
    /// Door is closed.
    Closed,
    /// Door is closed but not latched.
    Ajar,
    /// State has not been observed yet.
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl DoorState {
    /// Wire/display name of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Closed => "closed",
            DoorState::Ajar => "ajar",
            DoorState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state view of the push-stream health.
///
/// Derived from the stream client's state machine, never stored on the
/// wire. The boolean mirror in [`DeviceState::connected`] collapses
/// `Reconnecting` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionStatus {
    /// Stream is open and receiving.
    Connected,
    /// Stream dropped; a reconnect attempt is pending or in flight.
    Reconnecting,
    /// No stream and no reconnect pending.
    #[default]
    Disconnected,
}

impl ConnectionStatus {
    /// Boolean collapse used for the `connected` display field.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    /// Display name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-known full state of the lock.
///
/// Exactly one `DeviceState` is live at a time; partial snapshots
/// ([`StatePatch`]) overwrite only the fields they carry.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceState {
    /// Bolt position.
    pub lock_state: LockState,
    /// Door contact state.
    pub door_state: DoorState,
    /// Battery percentage (0-100), if ever reported.
    pub battery_level: Option<u8>,
    /// Battery voltage in volts, if the lock reports it.
    pub battery_voltage: Option<f32>,
    /// Whether the doorbell is currently ringing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub doorbell_ringing: bool,
    /// Signal strength in dBm, if reported.
    pub rssi: Option<i16>,
    /// Whether auto-lock is enabled on the device.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_lock_enabled: bool,
    /// Auto-lock delay in seconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_lock_duration: u32,
    /// Boolean mirror of [`ConnectionStatus`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub connected: bool,
    /// Lock model string, if known.
    pub lock_model: Option<String>,
    /// Lock serial number, if known.
    pub lock_serial: Option<String>,
    /// Lock firmware version, if known.
    pub lock_firmware: Option<String>,
    /// When any field last changed.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::timestamp")
    )]
    pub last_updated: Option<OffsetDateTime>,
    /// When the lock last did something user-visible.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::timestamp")
    )]
    pub last_activity: Option<OffsetDateTime>,
    /// Kind of the last activity (e.g. "lock", "door_open", "doorbell").
    pub last_activity_type: Option<String>,
}

/// A partial device-state snapshot as pushed by the server.
///
/// Every field is optional; absent (or `null`) fields leave the
/// corresponding [`DeviceState`] field untouched when merged.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatePatch {
    pub lock_state: Option<LockState>,
    pub door_state: Option<DoorState>,
    pub battery_level: Option<u8>,
    pub battery_voltage: Option<f32>,
    pub doorbell_ringing: Option<bool>,
    pub rssi: Option<i16>,
    pub auto_lock_enabled: Option<bool>,
    pub auto_lock_duration: Option<u32>,
    pub connected: Option<bool>,
    pub lock_model: Option<String>,
    pub lock_serial: Option<String>,
    pub lock_firmware: Option<String>,
    #[cfg_attr(feature = "serde", serde(with = "crate::timestamp"))]
    pub last_updated: Option<OffsetDateTime>,
    #[cfg_attr(feature = "serde", serde(with = "crate::timestamp"))]
    pub last_activity: Option<OffsetDateTime>,
    pub last_activity_type: Option<String>,
}

impl StatePatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == StatePatch::default()
    }
}

/// Supplementary scheduler diagnostics, replaced wholesale on each pull.
///
/// The monitor emits `next_interval_sec` as a float; fractional values
/// are preserved.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulerDiagnostics {
    /// Scheduler mode, e.g. "active", "normal", "quiet".
    pub mode: String,
    /// Seconds until the next scheduled poll, if reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_interval_sec: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_state_round_trip() {
        let json = serde_json::to_string(&LockState::Locked).unwrap();
        assert_eq!(json, "\"locked\"");
        let state: LockState = serde_json::from_str("\"unlocking\"").unwrap();
        assert_eq!(state, LockState::Unlocking);
    }

    #[test]
    fn test_unrecognized_lock_state_is_unknown() {
        let state: LockState = serde_json::from_str("\"calibrating\"").unwrap();
        assert_eq!(state, LockState::Unknown);
    }

    #[test]
    fn test_patch_deserializes_partial_payload() {
        let patch: StatePatch = serde_json::from_str(r#"{"door_state": "open"}"#).unwrap();
        assert_eq!(patch.door_state, Some(DoorState::Open));
        assert!(patch.lock_state.is_none());
        assert!(patch.battery_level.is_none());
    }

    #[test]
    fn test_patch_accepts_empty_timestamp_string() {
        // The monitor serializes never-set timestamps as "".
        let patch: StatePatch =
            serde_json::from_str(r#"{"last_updated": "", "lock_state": "locked"}"#).unwrap();
        assert!(patch.last_updated.is_none());
        assert_eq!(patch.lock_state, Some(LockState::Locked));
    }

    #[test]
    fn test_patch_parses_rfc3339_timestamp() {
        let patch: StatePatch =
            serde_json::from_str(r#"{"last_updated": "2026-01-05T10:30:00.123456+00:00"}"#)
                .unwrap();
        let ts = patch.last_updated.unwrap();
        assert_eq!(ts.year(), 2026);
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_null_field_treated_as_absent() {
        let patch: StatePatch = serde_json::from_str(r#"{"battery_level": null}"#).unwrap();
        assert!(patch.battery_level.is_none());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_connection_status_collapse() {
        assert!(ConnectionStatus::Connected.is_connected());
        assert!(!ConnectionStatus::Reconnecting.is_connected());
        assert!(!ConnectionStatus::Disconnected.is_connected());
    }

    #[test]
    fn test_scheduler_diagnostics_accepts_float_interval() {
        let diag: SchedulerDiagnostics =
            serde_json::from_str(r#"{"mode": "active", "next_interval_sec": 5.0}"#).unwrap();
        assert_eq!(diag.mode, "active");
        assert_eq!(diag.next_interval_sec, Some(5.0));
    }

    #[test]
    fn test_scheduler_diagnostics_interval_optional() {
        let diag: SchedulerDiagnostics = serde_json::from_str(r#"{"mode": "quiet"}"#).unwrap();
        assert!(diag.next_interval_sec.is_none());
    }
}
