//! Stream client and reconnect state machine.
//!
//! The client owns one background task that drives the connection
//! lifecycle:
//!
//! ```text
//! Idle -> Connecting -> Open -> ReconnectWait -> Connecting -> ...
//!                                    Closed (terminal, via stop())
//! ```
//!
//! Every connect failure, stream error, or clean server close lands in
//! `ReconnectWait`, which sleeps a fixed delay and tries again,
//! forever. Only [`StreamClient::stop`] ends the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use latchview_types::{ConnectionStatus, TimelineEvent};

use crate::diagnostics::{DiagnosticsPoller, DiagnosticsSource, HttpDiagnosticsSource};
use crate::error::{Error, Result};
use crate::protocol::{self, StreamMessage};
use crate::sse::SseTransport;
use crate::store::StateStore;
use crate::timeline::{DEFAULT_TIMELINE_CAPACITY, EventTimeline};
use crate::transport::StreamTransport;
use crate::updates::{DashboardUpdate, DashboardView, UpdateReceiver, UpdateSender, update_channel};

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Default capacity of the update broadcast channel.
pub const DEFAULT_UPDATE_BUFFER: usize = 64;

/// Configuration options for [`StreamClient`].
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Capacity of the update broadcast channel.
    pub update_buffer: usize,
    /// Maximum number of timeline events retained.
    pub timeline_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            update_buffer: DEFAULT_UPDATE_BUFFER,
            timeline_capacity: DEFAULT_TIMELINE_CAPACITY,
        }
    }
}

impl StreamOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the update channel capacity.
    #[must_use]
    pub fn with_update_buffer(mut self, capacity: usize) -> Self {
        self.update_buffer = capacity;
        self
    }

    /// Set the timeline capacity.
    #[must_use]
    pub fn with_timeline_capacity(mut self, capacity: usize) -> Self {
        self.timeline_capacity = capacity;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_delay.is_zero() {
            return Err(Error::invalid_config("reconnect_delay must be > 0"));
        }
        if self.update_buffer == 0 {
            return Err(Error::invalid_config("update_buffer must be > 0"));
        }
        if self.timeline_capacity == 0 {
            return Err(Error::invalid_config("timeline_capacity must be > 0"));
        }
        Ok(())
    }
}

/// Lifecycle state of the stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Created, not yet started.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The stream is open and delivering messages.
    Open,
    /// Waiting out the back-off delay before the next attempt.
    ReconnectWait,
    /// Stopped. Terminal; the client cannot be restarted.
    Closed,
}

impl ClientState {
    /// The connection status this state presents to the display layer.
    ///
    /// `Connecting` and `ReconnectWait` both show as reconnecting: the
    /// display does not distinguish a first connect from a retry.
    #[must_use]
    pub fn connection_status(self) -> ConnectionStatus {
        match self {
            ClientState::Open => ConnectionStatus::Connected,
            ClientState::Connecting | ClientState::ReconnectWait => ConnectionStatus::Reconnecting,
            ClientState::Idle | ClientState::Closed => ConnectionStatus::Disconnected,
        }
    }
}

/// Client for the monitor's push stream.
///
/// Owns the canonical [`StateStore`] and [`EventTimeline`] and mutates
/// them only from its background task. The display layer observes via
/// [`subscribe`](Self::subscribe) or the snapshot accessors.
pub struct StreamClient {
    inner: Arc<ClientInner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

struct ClientInner {
    transport: Arc<dyn StreamTransport>,
    poller: DiagnosticsPoller,
    store: Arc<RwLock<StateStore>>,
    timeline: Arc<RwLock<EventTimeline>>,
    updates: UpdateSender,
    options: StreamOptions,
    state: RwLock<ClientState>,
    cancel: CancellationToken,
}

impl StreamClient {
    /// Create a client over explicit transport and diagnostics seams.
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        diagnostics: Arc<dyn DiagnosticsSource>,
        options: StreamOptions,
    ) -> Result<Self> {
        options.validate()?;
        let store = Arc::new(RwLock::new(StateStore::new()));
        let timeline = Arc::new(RwLock::new(EventTimeline::with_capacity(
            options.timeline_capacity,
        )));
        let (updates, _rx) = update_channel(options.update_buffer);
        let cancel = CancellationToken::new();
        let poller = DiagnosticsPoller::new(
            diagnostics,
            Arc::clone(&store),
            updates.clone(),
            cancel.clone(),
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                poller,
                store,
                timeline,
                updates,
                options,
                state: RwLock::new(ClientState::Idle),
                cancel,
            }),
            handle: Mutex::new(None),
        })
    }

    /// Create a client for a monitor at `base_url`, using the standard
    /// SSE and diagnostics endpoints.
    pub fn for_server(base_url: &str, options: StreamOptions) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        let transport = Arc::new(SseTransport::new(format!("{base}/api/events/stream"))?);
        let diagnostics = Arc::new(HttpDiagnosticsSource::new(format!("{base}/api/diagnostics"))?);
        Self::new(transport, diagnostics, options)
    }

    /// Subscribe to dashboard updates.
    #[must_use]
    pub fn subscribe(&self) -> UpdateReceiver {
        self.inner.updates.subscribe()
    }

    /// The current lifecycle state.
    pub async fn state(&self) -> ClientState {
        *self.inner.state.read().await
    }

    /// Owned snapshot of state, connection, and diagnostics.
    pub async fn view(&self) -> DashboardView {
        self.inner.store.read().await.view()
    }

    /// Owned snapshot of the timeline, newest-first.
    pub async fn timeline_snapshot(&self) -> Vec<TimelineEvent> {
        self.inner.timeline.read().await.snapshot()
    }

    /// Whether event history has been received at least once.
    pub async fn timeline_initialized(&self) -> bool {
        self.inner.timeline.read().await.is_initialized()
    }

    /// Start the background connection task.
    ///
    /// Fails with [`Error::AlreadyStarted`] if already running and
    /// [`Error::Stopped`] if the client was stopped; a stopped client
    /// is never restarted.
    pub async fn start(&self) -> Result<()> {
        {
            let mut state = self.inner.state.write().await;
            match *state {
                ClientState::Idle => *state = ClientState::Connecting,
                ClientState::Closed => return Err(Error::Stopped),
                _ => return Err(Error::AlreadyStarted),
            }
        }
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(inner.run());
        *self.handle.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the client and wait for the background task to finish.
    ///
    /// Idempotent. Interrupts an in-flight connect attempt or back-off
    /// wait immediately.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let handle = self.handle.lock().await.take();
        match handle {
            Some(handle) => {
                if let Err(err) = handle.await {
                    warn!(error = %err, "stream task ended abnormally");
                }
            }
            // Never started; mark terminal directly.
            None => self.inner.finish().await,
        }
    }
}

impl ClientInner {
    async fn run(self: Arc<Self>) {
        loop {
            self.set_state(ClientState::Connecting).await;
            self.publish_connection(ConnectionStatus::Reconnecting).await;

            let opened = tokio::select! {
                () = self.cancel.cancelled() => break,
                opened = self.transport.open() => opened,
            };

            match opened {
                Ok(mut stream) => {
                    self.set_state(ClientState::Open).await;
                    self.publish_connection(ConnectionStatus::Connected).await;
                    info!("event stream connected");

                    loop {
                        let frame = tokio::select! {
                            () = self.cancel.cancelled() => return self.finish().await,
                            frame = stream.next_frame() => frame,
                        };
                        match frame {
                            Ok(Some(frame)) => self.handle_frame(&frame).await,
                            Ok(None) => {
                                warn!("event stream closed by server");
                                break;
                            }
                            Err(err) => {
                                warn!(error = %err, "event stream failed");
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "connect attempt failed");
                }
            }

            self.set_state(ClientState::ReconnectWait).await;
            self.publish_connection(ConnectionStatus::Reconnecting).await;
            debug!(delay = ?self.options.reconnect_delay, "waiting before reconnect");
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.options.reconnect_delay) => {}
            }
        }
        self.finish().await;
    }

    /// Decode and apply one frame. Undecodable frames are dropped
    /// without touching state; the stream stays open.
    async fn handle_frame(&self, frame: &str) {
        let message = match protocol::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "dropping undecodable stream message");
                return;
            }
        };

        match message {
            StreamMessage::Unknown => {
                debug!("ignoring stream message of unknown type");
                return;
            }
            StreamMessage::InitialState { state, events } => {
                let timeline = {
                    let mut timeline = self.timeline.write().await;
                    timeline.initialize(events);
                    timeline.snapshot()
                };
                let view = {
                    let mut store = self.store.write().await;
                    store.apply_snapshot(state);
                    store.view()
                };
                let _ = self.updates.send(DashboardUpdate::Snapshot { view, timeline });
            }
            StreamMessage::StateUpdate { state, event } => {
                let view = {
                    let mut store = self.store.write().await;
                    store.apply_snapshot(state);
                    store.view()
                };
                match event {
                    Some(event) => {
                        let timeline = {
                            let mut timeline = self.timeline.write().await;
                            timeline.append(event.clone());
                            timeline.snapshot()
                        };
                        let _ = self
                            .updates
                            .send(DashboardUpdate::Timeline { view, event, timeline });
                    }
                    None => {
                        let _ = self.updates.send(DashboardUpdate::State { view });
                    }
                }
            }
        }

        // Handled a real message; refresh diagnostics off-task so a
        // slow endpoint never stalls the stream loop.
        self.poller.spawn_pull();
    }

    async fn set_state(&self, state: ClientState) {
        *self.state.write().await = state;
    }

    /// Apply a connection status change and publish it, deduplicating
    /// no-op transitions.
    async fn publish_connection(&self, status: ConnectionStatus) {
        let view = {
            let mut store = self.store.write().await;
            if store.connection() == status {
                return;
            }
            store.apply_connection_status(status);
            store.view()
        };
        let _ = self.updates.send(DashboardUpdate::State { view });
    }

    async fn finish(&self) {
        self.set_state(ClientState::Closed).await;
        self.publish_connection(ConnectionStatus::Disconnected).await;
        info!("stream client stopped");
    }
}
