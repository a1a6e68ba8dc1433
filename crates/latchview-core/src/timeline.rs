//! Bounded, ordered buffer of state-change events.
//!
//! The timeline keeps the most recent events newest-first, bounded at
//! [`DEFAULT_TIMELINE_CAPACITY`] entries. Ordering is strictly by
//! arrival, not by event timestamp: the server is the ordering
//! authority and the stream is the trust boundary.

use std::collections::VecDeque;

use latchview_types::TimelineEvent;

/// Default maximum number of events retained.
pub const DEFAULT_TIMELINE_CAPACITY: usize = 100;

/// Bounded, newest-first buffer of [`TimelineEvent`]s.
///
/// Events are immutable once appended; corrections arrive as new
/// events, never as patches to history. An empty-but-initialized
/// timeline ("no events") is distinguishable from one that has never
/// received history via [`is_initialized`](Self::is_initialized).
#[derive(Debug, Clone)]
pub struct EventTimeline {
    events: VecDeque<TimelineEvent>,
    capacity: usize,
    initialized: bool,
}

impl EventTimeline {
    /// Create an empty, uninitialized timeline with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TIMELINE_CAPACITY)
    }

    /// Create an empty, uninitialized timeline with a custom capacity.
    ///
    /// A zero capacity is clamped to 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            initialized: false,
        }
    }

    /// Replace all contents with the given events.
    ///
    /// The input is expected oldest-first (the wire order of the
    /// `initial_state` message) and is re-ordered newest-first; only
    /// the newest `capacity` events are retained. Calling this again
    /// within the same connection epoch simply re-initializes.
    pub fn initialize(&mut self, events: Vec<TimelineEvent>) {
        self.events = events
            .into_iter()
            .rev()
            .take(self.capacity)
            .collect();
        self.initialized = true;
    }

    /// Insert an event at the most-recent position.
    ///
    /// Evicts the oldest entries until the length bound holds again.
    pub fn append(&mut self, event: TimelineEvent) {
        self.events.push_front(event);
        while self.events.len() > self.capacity {
            self.events.pop_back();
        }
        self.initialized = true;
    }

    /// The current ordered sequence, newest-first.
    ///
    /// Returns an owned copy so callers can never alias the internal
    /// buffer.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TimelineEvent> {
        self.events.iter().cloned().collect()
    }

    /// The newest event, if any.
    #[must_use]
    pub fn newest(&self) -> Option<&TimelineEvent> {
        self.events.front()
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether event history has been received at least once.
    ///
    /// Distinguishes "no events" from "not yet initialized".
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The configured length bound.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventTimeline {
    fn default() -> Self {
        Self::new()
    }
}
