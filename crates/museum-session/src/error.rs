//! Error types for the session layer.

use museum_level::LevelError;
use museum_protocol::{ClientPacketId, ProtocolError};

/// Errors that end a session.
///
/// Application-level problems (an unknown level name, a bad command) are
/// answered with a chat notice and never become a `SessionError`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Framing or decode failure. The byte stream can't be trusted any
    /// more, so the connection is dropped without a kick message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The first packet of the session was not a Hello.
    #[error("expected Hello, got {0:?}")]
    UnexpectedPacket(ClientPacketId),

    /// The mandatory initial level couldn't be resolved or loaded.
    #[error(transparent)]
    Level(#[from] LevelError),

    /// Gzip-compressing the level payload failed.
    #[error("level compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// The blocking task that decodes level files panicked or was
    /// cancelled.
    #[error("level loader task failed: {0}")]
    LoaderTask(#[from] tokio::task::JoinError),

    /// The level's block count doesn't fit the 32-bit size prefix.
    #[error("level of {0} blocks is too large to transfer")]
    LevelTooLarge(usize),

    /// The session configuration can't be sent on the wire.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
}
