//! Wire protocol for the museum server.
//!
//! This crate speaks exactly one dialect: the classic protocol, version 7.
//! Everything on the wire is fixed width, so the crate is mostly byte
//! layouts:
//!
//! - **Bytes** ([`bytes`]) — big-endian integers and 64-byte padded
//!   strings.
//! - **Types** ([`ClientPacket`], [`ServerPacket`], packet IDs) — the
//!   packets that travel on the wire and how each one is laid out.
//! - **Codecs** — [`ServerEncoder`] / [`ClientDecoder`] for the server's
//!   side of a connection, [`ClientEncoder`] / [`ServerDecoder`] for the
//!   client's.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (TCP stream) → Protocol (packets) → Session (state machine)
//! ```

pub mod bytes;
mod decoder;
mod encoder;
mod error;
mod peer;
mod types;

pub use decoder::ClientDecoder;
pub use encoder::ServerEncoder;
pub use error::ProtocolError;
pub use peer::{ClientEncoder, ServerDecoder};
pub use types::{
    CHUNK_LEN, ChatMessage, ClientHello, ClientPacket, ClientPacketId,
    LevelDataChunk, LevelFinalize, PLAYER_SELF, PROTOCOL_VERSION, PlayerType,
    PositionUpdate, SENDER_SERVER, ServerHello, ServerMessage, ServerPacket,
    ServerPacketId, SetBlock, SpawnPlayer, percent_complete,
};
