//! Trait seam between the stream client and the wire.
//!
//! The state machine in [`crate::stream`] is written against these
//! traits so it can be driven by the real SSE transport
//! ([`crate::sse::SseTransport`]) in production and by
//! [`crate::mock::MockTransport`] in tests, without a real network
//! stack.

use async_trait::async_trait;

use crate::error::Result;

/// Factory for push-stream connections.
///
/// Each call to [`open`](Self::open) is one connect attempt; the
/// returned stream is exclusively owned by the client and discarded on
/// any error (partial frames are never replayed).
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open a new stream connection.
    async fn open(&self) -> Result<Box<dyn MessageStream>>;
}

/// One open, unidirectional, server-push text stream.
#[async_trait]
pub trait MessageStream: Send {
    /// Await the next complete text frame.
    ///
    /// Returns `Ok(None)` when the server closes the stream cleanly;
    /// both `Ok(None)` and `Err` end the connection epoch.
    async fn next_frame(&mut self) -> Result<Option<String>>;
}
