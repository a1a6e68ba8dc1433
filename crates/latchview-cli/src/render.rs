//! Console rendering of dashboard updates.
//!
//! Each update prints as one or a few lines; there is no alternate
//! screen or cursor control, so the output stays greppable and plays
//! well with pipes.

use owo_colors::OwoColorize;
use time::OffsetDateTime;

use latchview_core::format;
use latchview_core::{DashboardUpdate, DashboardView};
use latchview_types::{ConnectionStatus, LockState, TimelineEvent};

/// Line-oriented renderer for the console dashboard.
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Create a renderer; `color` controls ANSI styling.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Print one update.
    pub fn print_update(&self, update: &DashboardUpdate) {
        match update {
            DashboardUpdate::Snapshot { view, timeline } => {
                println!("{}", self.state_line(view));
                println!(
                    "  last update: {}",
                    format::format_full_or_never(view.state.last_updated)
                );
                println!("  {}", self.activity_line(view, OffsetDateTime::now_utc()));
                if timeline.is_empty() {
                    println!("  no events yet");
                } else {
                    println!("  last {} events:", timeline.len());
                    for event in timeline {
                        println!("  {}", self.event_line(event));
                    }
                }
            }
            DashboardUpdate::State { view } => {
                println!("{}", self.state_line(view));
            }
            DashboardUpdate::Timeline { view, event, .. } => {
                println!("{}", self.event_line(event));
                println!("{}", self.state_line(view));
            }
            DashboardUpdate::Diagnostics { view } => {
                if let Some(line) = self.diagnostics_line(view) {
                    println!("{line}");
                }
            }
            // The update enum is non-exhaustive; kinds this renderer
            // does not know about are skipped, like unknown stream
            // message types.
            _ => {}
        }
    }

    /// One-line state summary.
    pub fn state_line(&self, view: &DashboardView) -> String {
        let state = &view.state;
        let mut line = format!(
            "[{}] lock: {}  door: {}",
            self.connection_label(view.connection),
            self.lock_label(state.lock_state),
            state.door_state,
        );
        if let Some(level) = state.battery_level {
            line.push_str(&format!("  battery: {level}%"));
        }
        if let Some(rssi) = state.rssi {
            line.push_str(&format!("  rssi: {rssi} dBm"));
        }
        if state.doorbell_ringing {
            line.push_str(&format!("  {}", self.paint_bold("DOORBELL")));
        }
        line
    }

    /// One-line event summary, e.g. `10:00:03 lock_state: locked -> unlocked (ble)`.
    pub fn event_line(&self, event: &TimelineEvent) -> String {
        format!(
            "{} {}: {} -> {} ({})",
            format::format_clock(event.timestamp),
            event.event_type,
            event.old_value,
            event.new_value,
            event.source,
        )
    }

    /// Scheduler summary, if diagnostics have ever been pulled.
    pub fn diagnostics_line(&self, view: &DashboardView) -> Option<String> {
        let diagnostics = view.diagnostics.as_ref()?;
        let mut line = format!("scheduler: {}", diagnostics.mode);
        if let Some(interval) = diagnostics.next_interval_sec {
            line.push_str(&format!(", next poll in {interval:.1}s"));
        }
        Some(line)
    }

    /// Footer for the newest activity, relative to `now`.
    pub fn activity_line(&self, view: &DashboardView, now: OffsetDateTime) -> String {
        match view.state.last_activity {
            Some(timestamp) => format!("last activity: {}", format::format_ago(timestamp, now)),
            None => "last activity: never".to_string(),
        }
    }

    fn connection_label(&self, status: ConnectionStatus) -> String {
        if !self.color {
            return status.as_str().to_string();
        }
        match status {
            ConnectionStatus::Connected => status.as_str().green().to_string(),
            ConnectionStatus::Reconnecting => status.as_str().yellow().to_string(),
            ConnectionStatus::Disconnected => status.as_str().red().to_string(),
        }
    }

    fn lock_label(&self, state: LockState) -> String {
        if !self.color {
            return state.as_str().to_string();
        }
        match state {
            LockState::Locked => state.as_str().green().to_string(),
            LockState::Unlocked => state.as_str().yellow().to_string(),
            LockState::Jammed => state.as_str().red().bold().to_string(),
            _ => state.as_str().to_string(),
        }
    }

    fn paint_bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}
