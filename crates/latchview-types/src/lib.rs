//! Platform-agnostic types for the latchview smart-lock dashboard.
//!
//! This crate defines the canonical data model shared by the
//! synchronization engine and the presentation layer:
//!
//! - [`DeviceState`]: the last-known full state of the lock
//! - [`StatePatch`]: a partial snapshot merged into [`DeviceState`]
//! - [`TimelineEvent`]: one observed state transition
//! - [`ConnectionStatus`]: the tri-state view of stream health
//! - [`SchedulerDiagnostics`]: supplementary scheduler/mode data
//!
//! All types derive serde traits behind the default `serde` feature and
//! mirror the JSON shapes pushed by the monitor's event stream.

pub mod event;
pub mod state;

#[cfg(feature = "serde")]
pub(crate) mod timestamp;

pub use event::{EventKind, TimelineEvent};
pub use state::{
    ConnectionStatus, DeviceState, DoorState, LockState, SchedulerDiagnostics, StatePatch,
};
