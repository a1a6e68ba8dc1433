//! Mock transport and diagnostics source for tests.
//!
//! [`MockTransport`] replays a script of connection attempts and
//! frames, so reconnect behavior can be driven deterministically under
//! paused tokio time. [`MockDiagnostics`] returns a configurable
//! response and counts pulls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use latchview_types::SchedulerDiagnostics;

use crate::error::{Error, Result};
use crate::transport::{MessageStream, StreamTransport};

/// One scripted frame on an open connection.
#[derive(Debug, Clone)]
pub enum MockFrame {
    /// Deliver this text frame.
    Message(String),
    /// Fail the stream with a transport error.
    Error(String),
    /// Close the stream cleanly.
    Close,
}

/// One scripted connection attempt.
#[derive(Debug, Clone)]
pub enum MockConnect {
    /// Open succeeds; the stream then replays these frames. When the
    /// frames run out the stream stays open and idle.
    Open(Vec<MockFrame>),
    /// Open fails with a transport error.
    Fail(String),
}

/// Scripted [`StreamTransport`].
///
/// Each `open()` consumes the next [`MockConnect`] from the script; an
/// exhausted script hangs the connect attempt until cancelled.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockConnect>>,
    connect_count: AtomicU32,
}

impl MockTransport {
    /// Create a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that replays the given connection attempts.
    #[must_use]
    pub fn with_script(script: Vec<MockConnect>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            connect_count: AtomicU32::new(0),
        }
    }

    /// Append a connection attempt to the script.
    pub fn push_connect(&self, connect: MockConnect) {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(connect);
    }

    /// Number of `open()` calls observed so far.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn open(&self) -> Result<Box<dyn MessageStream>> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        match next {
            Some(MockConnect::Open(frames)) => Ok(Box::new(MockStream {
                frames: frames.into(),
            })),
            Some(MockConnect::Fail(reason)) => Err(Error::transport(reason)),
            // Script exhausted: park until the client is cancelled.
            None => futures::future::pending().await,
        }
    }
}

struct MockStream {
    frames: VecDeque<MockFrame>,
}

#[async_trait]
impl MessageStream for MockStream {
    async fn next_frame(&mut self) -> Result<Option<String>> {
        match self.frames.pop_front() {
            Some(MockFrame::Message(frame)) => Ok(Some(frame)),
            Some(MockFrame::Error(reason)) => Err(Error::transport(reason)),
            Some(MockFrame::Close) => Ok(None),
            // Open and idle; wait for cancellation.
            None => futures::future::pending().await,
        }
    }
}

/// Configurable [`DiagnosticsSource`](crate::diagnostics::DiagnosticsSource).
#[derive(Default)]
pub struct MockDiagnostics {
    response: std::sync::RwLock<Option<SchedulerDiagnostics>>,
    should_fail: AtomicBool,
    pull_count: AtomicU32,
}

impl MockDiagnostics {
    /// Create a source with no scheduler record and no failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostics returned by subsequent fetches.
    pub fn set_response(&self, diagnostics: SchedulerDiagnostics) {
        *self
            .response
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(diagnostics);
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches observed so far.
    pub fn pull_count(&self) -> u32 {
        self.pull_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl crate::diagnostics::DiagnosticsSource for MockDiagnostics {
    async fn fetch(&self) -> Result<Option<SchedulerDiagnostics>> {
        self.pull_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(Error::diagnostics("mock diagnostics failure"));
        }
        Ok(self
            .response
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}
