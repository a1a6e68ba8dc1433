//! Render-boundary update channel.
//!
//! The engine publishes a [`DashboardUpdate`] after every state or
//! timeline mutation. The display layer subscribes via a broadcast
//! channel and only ever receives owned snapshots; exact field
//! formatting belongs to the presentation layer, not this crate.

use latchview_types::{ConnectionStatus, DeviceState, SchedulerDiagnostics, TimelineEvent};
use tokio::sync::broadcast;

/// Everything the display layer needs to redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Last-known device state.
    pub state: DeviceState,
    /// Tri-state stream health.
    pub connection: ConnectionStatus,
    /// Last successfully pulled diagnostics, if any.
    pub diagnostics: Option<SchedulerDiagnostics>,
}

/// An update published toward the display layer.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new update
/// kinds in future versions without breaking downstream code.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum DashboardUpdate {
    /// Full refresh after an `initial_state` message: state and the
    /// whole event history were replaced.
    Snapshot {
        view: DashboardView,
        /// Complete timeline, newest-first.
        timeline: Vec<TimelineEvent>,
    },
    /// Device state changed with no accompanying history entry.
    State { view: DashboardView },
    /// A new event was appended to the timeline.
    Timeline {
        view: DashboardView,
        /// The newly appended event.
        event: TimelineEvent,
        /// Complete timeline after the append, newest-first.
        timeline: Vec<TimelineEvent>,
    },
    /// Scheduler diagnostics were refreshed.
    Diagnostics { view: DashboardView },
}

impl DashboardUpdate {
    /// The view carried by any update variant.
    #[must_use]
    pub fn view(&self) -> &DashboardView {
        match self {
            DashboardUpdate::Snapshot { view, .. }
            | DashboardUpdate::State { view }
            | DashboardUpdate::Timeline { view, .. }
            | DashboardUpdate::Diagnostics { view } => view,
        }
    }
}

/// Sender for dashboard updates.
pub type UpdateSender = broadcast::Sender<DashboardUpdate>;

/// Receiver for dashboard updates.
pub type UpdateReceiver = broadcast::Receiver<DashboardUpdate>;

/// Create a new update channel with the given capacity.
pub fn update_channel(capacity: usize) -> (UpdateSender, UpdateReceiver) {
    broadcast::channel(capacity)
}
