//! Synchronization engine for the latchview smart-lock dashboard.
//!
//! This crate keeps a local mirror of a lock monitor's state by
//! consuming its server-sent-events push stream. It owns the reconnect
//! loop, the canonical state store, the bounded event timeline, and the
//! best-effort diagnostics poller; display layers subscribe to a
//! broadcast channel of owned snapshots and never touch shared state.
//!
//! # Features
//!
//! - **Push-stream client**: SSE connection with automatic, unlimited
//!   reconnection at a fixed delay
//! - **State mirror**: partial snapshots merged into one canonical
//!   [`DeviceState`](latchview_types::DeviceState)
//! - **Event timeline**: bounded newest-first history of state changes
//! - **Diagnostics**: best-effort scheduler status, refreshed after
//!   every handled message
//! - **Testability**: transport and diagnostics are trait seams with
//!   scripted mocks
//!
//! # Quick Start
//!
//! ```no_run
//! use latchview_core::{StreamClient, StreamOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamClient::for_server("http://localhost:8099", StreamOptions::default())?;
//!     let mut updates = client.subscribe();
//!
//!     client.start().await?;
//!     while let Ok(update) = updates.recv().await {
//!         let view = update.view();
//!         println!("lock: {}", view.state.lock_state);
//!     }
//!
//!     client.stop().await;
//!     Ok(())
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod format;
pub mod mock;
pub mod protocol;
pub mod sse;
pub mod store;
pub mod stream;
pub mod timeline;
pub mod transport;
pub mod updates;

pub use diagnostics::{DiagnosticsSource, HttpDiagnosticsSource};
pub use error::{Error, Result};
pub use protocol::{StreamMessage, decode};
pub use sse::SseTransport;
pub use store::StateStore;
pub use stream::{
    ClientState, DEFAULT_RECONNECT_DELAY, DEFAULT_UPDATE_BUFFER, StreamClient, StreamOptions,
};
pub use timeline::{DEFAULT_TIMELINE_CAPACITY, EventTimeline};
pub use transport::{MessageStream, StreamTransport};
pub use updates::{
    DashboardUpdate, DashboardView, UpdateReceiver, UpdateSender, update_channel,
};
