//! Error types for latchview-core.
//!
//! The engine distinguishes three failure classes with very different
//! handling:
//!
//! | Error | Handling |
//! |-------|----------|
//! | [`Error::Transport`] | Always recoverable; triggers the reconnect back-off and is surfaced only as `connected = false` |
//! | [`Error::Decode`] | Absorbed per message; the message is dropped, no state is touched, the stream stays open |
//! | [`Error::Diagnostics`] | Fully swallowed; the diagnostics record simply stays stale |
//!
//! No error in this crate is fatal to the process.

use thiserror::Error;

/// Errors produced by the synchronization engine.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error
/// variants in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The stream connection never opened or dropped after opening.
    #[error("transport error: {0}")]
    Transport(String),

    /// A pushed message was not valid JSON or had an unusable shape.
    #[error("undecodable stream message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The diagnostics pull failed (network, status, or decode).
    #[error("diagnostics request failed: {0}")]
    Diagnostics(String),

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start()` was called on a client that is already running.
    #[error("stream client already started")]
    AlreadyStarted,

    /// `start()` was called on a client that has been stopped.
    #[error("stream client has been stopped")]
    Stopped,
}

impl Error {
    /// Create a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// Create a diagnostics error from any displayable cause.
    pub fn diagnostics(cause: impl std::fmt::Display) -> Self {
        Self::Diagnostics(cause.to_string())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using latchview-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
