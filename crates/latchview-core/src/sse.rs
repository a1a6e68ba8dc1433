//! Server-sent-events transport.
//!
//! Connects to the monitor's `/api/events/stream` endpoint and turns
//! the byte stream into complete text frames. Only `data:` lines carry
//! payload; comment lines (`: heartbeat`) and any other SSE fields are
//! ignored.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::{MessageStream, StreamTransport};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`StreamTransport`] backed by an HTTP server-sent-events endpoint.
pub struct SseTransport {
    url: String,
    client: reqwest::Client,
}

impl SseTransport {
    /// Create a transport for the given stream URL.
    ///
    /// The URL must be absolute (`http://` or `https://`). No
    /// connection is attempted until [`open`](StreamTransport::open).
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::invalid_config(format!(
                "stream URL must start with http:// or https://, got: {url}"
            )));
        }

        // Connect timeout only; a total request timeout would kill the
        // long-lived stream.
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::transport)?;

        Ok(Self { url, client })
    }

    /// The configured stream URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StreamTransport for SseTransport {
    async fn open(&self) -> Result<Box<dyn MessageStream>> {
        debug!(url = %self.url, "opening event stream");
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(Error::transport)?;

        let response = response.error_for_status().map_err(Error::transport)?;

        Ok(Box::new(SseStream {
            bytes: Box::pin(response.bytes_stream()),
            decoder: FrameDecoder::new(),
        }))
    }
}

/// One open SSE connection.
struct SseStream {
    bytes: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    decoder: FrameDecoder,
}

#[async_trait]
impl MessageStream for SseStream {
    async fn next_frame(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(frame) = self.decoder.next_frame() {
                return Ok(Some(frame));
            }
            match self.bytes.next().await {
                Some(Ok(chunk)) => self.decoder.push(&chunk),
                Some(Err(err)) => return Err(Error::transport(err)),
                // Clean EOF; a partial trailing frame is discarded.
                None => return Ok(None),
            }
        }
    }
}

/// Incremental SSE frame decoder.
///
/// Chunk boundaries carry no meaning in SSE, so bytes are buffered
/// until a blank line terminates the pending event.
#[derive(Debug, Default)]
struct FrameDecoder {
    buf: Vec<u8>,
    data: String,
}

impl FrameDecoder {
    fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the wire.
    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete event's data payload, if one is buffered.
    fn next_frame(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                // Blank line dispatches the accumulated event.
                if !self.data.is_empty() {
                    return Some(std::mem::take(&mut self.data));
                }
                continue;
            }
            if let Some(payload) = line.strip_prefix("data:") {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(payload.strip_prefix(' ').unwrap_or(payload));
            }
            // Comments (": heartbeat") and other fields are ignored.
        }
        None
    }
}
