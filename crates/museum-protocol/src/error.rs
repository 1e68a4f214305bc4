//! Error types for the protocol layer.
//!
//! The variants fall into three groups:
//!
//! - framing violations on the wire (`ShortRead`, `ShortWrite`,
//!   `TruncatedRead`, `Closed`), always fatal to a connection since the
//!   protocol has no resynchronization marker;
//! - malformed client input (`UnknownPacketId`,
//!   `UnsupportedProtocolVersion`);
//! - encode-side precondition violations (`StringTooLong`,
//!   `ChunkTooLarge`, `InvalidProgress`, `BadDestinationSize`). Correct
//!   internal callers never produce these.

/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A single read returned fewer bytes than the field needs.
    #[error("read too short: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The underlying writer did not consume the whole buffer.
    #[error("write too short: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    /// A packet body ended before all of its fields were read.
    #[error("truncated read: expected {expected} bytes, got {actual}")]
    TruncatedRead { expected: usize, actual: usize },

    /// The peer closed the stream cleanly between two packets.
    #[error("connection closed")]
    Closed,

    /// The peer sent a packet ID this side of the protocol doesn't accept.
    #[error("unknown packet id 0x{0:02x}")]
    UnknownPacketId(u8),

    /// The handshake carried a protocol version other than 7.
    #[error("unsupported protocol version {0}")]
    UnsupportedProtocolVersion(u8),

    /// A string field exceeded the 64-byte wire width.
    #[error("string length {0} exceeds 64 bytes")]
    StringTooLong(usize),

    /// A level data chunk exceeded 1024 bytes.
    #[error("level data chunk of {0} bytes exceeds 1024")]
    ChunkTooLarge(usize),

    /// Transfer progress claimed more bytes sent than exist.
    #[error("invalid progress: sent {sent} > total {total}")]
    InvalidProgress { sent: usize, total: usize },

    /// A string was written into a region that isn't 64 bytes wide.
    #[error("string destination is {0} bytes, expected 64")]
    BadDestinationSize(usize),

    /// Any other I/O failure from the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns `true` if the peer simply went away between packets.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
