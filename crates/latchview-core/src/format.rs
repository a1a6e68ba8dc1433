//! Timestamp formatting for the dashboard.
//!
//! Pure functions over [`OffsetDateTime`]; no clock access. Callers
//! pass "now" explicitly so relative formatting stays deterministic
//! and testable.

use time::OffsetDateTime;

/// Format as a wall clock, `HH:MM:SS`.
#[must_use]
pub fn format_clock(timestamp: OffsetDateTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}

/// Format as a full timestamp, `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_full(timestamp: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {}",
        timestamp.year(),
        u8::from(timestamp.month()),
        timestamp.day(),
        format_clock(timestamp)
    )
}

/// Format the distance from `timestamp` back to `now`, e.g. `42s ago`.
///
/// Future timestamps (clock skew between monitor and client) collapse
/// to `just now`.
#[must_use]
pub fn format_ago(timestamp: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = (now - timestamp).whole_seconds();
    if elapsed < 1 {
        return "just now".to_string();
    }
    if elapsed < 60 {
        return format!("{elapsed}s ago");
    }
    let minutes = elapsed / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Format an optional timestamp, falling back to `never`.
#[must_use]
pub fn format_full_or_never(timestamp: Option<OffsetDateTime>) -> String {
    match timestamp {
        Some(timestamp) => format_full(timestamp),
        None => "never".to_string(),
    }
}
