//! Canonical state store for the dashboard.
//!
//! Holds the last-known [`DeviceState`], the derived [`ConnectionStatus`],
//! and the independently-updated [`SchedulerDiagnostics`]. All mutation
//! happens on the stream client's task; readers only ever see owned
//! snapshots.

use latchview_types::{ConnectionStatus, DeviceState, SchedulerDiagnostics, StatePatch};

use crate::updates::DashboardView;

/// Owner of the canonical device state.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    state: DeviceState,
    connection: ConnectionStatus,
    diagnostics: Option<SchedulerDiagnostics>,
}

impl StateStore {
    /// Create a store with everything unknown and disconnected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial snapshot into the canonical state.
    ///
    /// Only the fields present in `patch` are overwritten; absent
    /// fields are left untouched, never cleared. Returns the merged
    /// full state.
    pub fn apply_snapshot(&mut self, patch: StatePatch) -> DeviceState {
        let state = &mut self.state;
        if let Some(v) = patch.lock_state {
            state.lock_state = v;
        }
        if let Some(v) = patch.door_state {
            state.door_state = v;
        }
        if let Some(v) = patch.battery_level {
            state.battery_level = Some(v);
        }
        if let Some(v) = patch.battery_voltage {
            state.battery_voltage = Some(v);
        }
        if let Some(v) = patch.doorbell_ringing {
            state.doorbell_ringing = v;
        }
        if let Some(v) = patch.rssi {
            state.rssi = Some(v);
        }
        if let Some(v) = patch.auto_lock_enabled {
            state.auto_lock_enabled = v;
        }
        if let Some(v) = patch.auto_lock_duration {
            state.auto_lock_duration = v;
        }
        if let Some(v) = patch.connected {
            state.connected = v;
        }
        if let Some(v) = patch.lock_model {
            state.lock_model = Some(v);
        }
        if let Some(v) = patch.lock_serial {
            state.lock_serial = Some(v);
        }
        if let Some(v) = patch.lock_firmware {
            state.lock_firmware = Some(v);
        }
        if let Some(v) = patch.last_updated {
            state.last_updated = Some(v);
        }
        if let Some(v) = patch.last_activity {
            state.last_activity = Some(v);
        }
        if let Some(v) = patch.last_activity_type {
            state.last_activity_type = Some(v);
        }
        state.clone()
    }

    /// Update the derived connection status.
    ///
    /// This is the only path besides snapshot merge allowed to touch
    /// the `connected` display field from the stream layer.
    pub fn apply_connection_status(&mut self, status: ConnectionStatus) {
        self.connection = status;
        self.state.connected = status.is_connected();
    }

    /// Replace the scheduler diagnostics wholesale.
    ///
    /// Diagnostics are never merged field-by-field.
    pub fn apply_diagnostics(&mut self, diagnostics: SchedulerDiagnostics) {
        self.diagnostics = Some(diagnostics);
    }

    /// The current device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// The current connection status.
    #[must_use]
    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// The last successfully pulled diagnostics, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&SchedulerDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// An owned view of everything the display layer needs.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        DashboardView {
            state: self.state.clone(),
            connection: self.connection,
            diagnostics: self.diagnostics.clone(),
        }
    }
}
