//! Unified error type for the museum server.

use museum_level::LevelError;
use museum_protocol::ProtocolError;
use museum_session::SessionError;
use museum_transport::TransportError;

use crate::heartbeat::HeartbeatError;
use crate::tracker::TrackerUnavailable;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MuseumError {
    /// Binding or accepting on the listener failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The manifest or a level file couldn't be read.
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The announce server rejected or didn't answer a heartbeat.
    #[error(transparent)]
    Heartbeat(#[from] HeartbeatError),

    #[error(transparent)]
    Tracker(#[from] TrackerUnavailable),
}
