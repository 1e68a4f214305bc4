//! Packet types and their exact byte layouts.
//!
//! Inbound (client → server) and outbound (server → client) packets are
//! modelled as two closed enums, [`ClientPacket`] and [`ServerPacket`].
//! Each has a fixed size on the wire; `encode` builds exactly that many
//! bytes: the packet ID followed by the fields in wire order.

use crate::bytes::{STRING_LEN, write_i16, write_string};
use crate::ProtocolError;

/// The only protocol version this server speaks (classic 0.30).
pub const PROTOCOL_VERSION: u8 = 0x07;

/// Maximum payload carried by one [`LevelDataChunk`].
pub const CHUNK_LEN: usize = 1024;

/// Sender ID used for messages that come from the server itself.
pub const SENDER_SERVER: i8 = -1;

/// Player ID that tells the client "this spawn is you".
pub const PLAYER_SELF: i8 = -1;

// ---------------------------------------------------------------------------
// Packet IDs
// ---------------------------------------------------------------------------

/// The four packet IDs a client may send.
///
/// Converting a raw byte with `TryFrom` is the single place where
/// unknown IDs are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientPacketId {
    Hello = 0x00,
    SetBlock = 0x05,
    PositionUpdate = 0x08,
    Message = 0x0d,
}

impl ClientPacketId {
    /// Number of bytes that follow the ID byte.
    pub const fn body_len(self) -> usize {
        match self {
            Self::Hello => 1 + STRING_LEN + STRING_LEN + 1,
            Self::SetBlock => 2 + 2 + 2 + 1 + 1,
            Self::PositionUpdate => 1 + 2 + 2 + 2 + 1 + 1,
            Self::Message => 1 + STRING_LEN,
        }
    }
}

impl TryFrom<u8> for ClientPacketId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Hello),
            0x05 => Ok(Self::SetBlock),
            0x08 => Ok(Self::PositionUpdate),
            0x0d => Ok(Self::Message),
            other => Err(ProtocolError::UnknownPacketId(other)),
        }
    }
}

/// The packet IDs the server sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerPacketId {
    Hello = 0x00,
    LevelInit = 0x02,
    LevelDataChunk = 0x03,
    LevelFinalize = 0x04,
    SpawnPlayer = 0x07,
    Message = 0x0d,
    Kick = 0x0e,
}

impl ServerPacketId {
    /// Number of bytes that follow the ID byte.
    pub const fn body_len(self) -> usize {
        match self {
            Self::Hello => 1 + STRING_LEN + STRING_LEN + 1,
            Self::LevelInit => 0,
            Self::LevelDataChunk => 2 + CHUNK_LEN + 1,
            Self::LevelFinalize => 2 + 2 + 2,
            Self::SpawnPlayer => 1 + STRING_LEN + 2 + 2 + 2 + 1 + 1,
            Self::Message => 1 + STRING_LEN,
            Self::Kick => STRING_LEN,
        }
    }
}

impl TryFrom<u8> for ServerPacketId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Hello),
            0x02 => Ok(Self::LevelInit),
            0x03 => Ok(Self::LevelDataChunk),
            0x04 => Ok(Self::LevelFinalize),
            0x07 => Ok(Self::SpawnPlayer),
            0x0d => Ok(Self::Message),
            0x0e => Ok(Self::Kick),
            other => Err(ProtocolError::UnknownPacketId(other)),
        }
    }
}

/// Permission level announced in the server hello.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerType(pub u8);

impl PlayerType {
    pub const NORMAL: Self = Self(0x00);
    /// Operators may fly through and break bedrock client-side.
    pub const OPERATOR: Self = Self(0x64);
}

// ---------------------------------------------------------------------------
// Client packets
// ---------------------------------------------------------------------------

/// First packet of every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    pub protocol_version: u8,
    pub name: String,
    /// Name verification token. This server never checks it.
    pub verification_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetBlock {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    /// 0 = destroyed, 1 = created.
    pub mode: u8,
    pub block_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub yaw: u8,
    pub pitch: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
}

/// A decoded client → server packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    Hello(ClientHello),
    SetBlock(SetBlock),
    PositionUpdate(PositionUpdate),
    Message(ChatMessage),
}

impl ClientPacket {
    /// Returns the packet's wire ID.
    pub fn id(&self) -> ClientPacketId {
        match self {
            Self::Hello(_) => ClientPacketId::Hello,
            Self::SetBlock(_) => ClientPacketId::SetBlock,
            Self::PositionUpdate(_) => ClientPacketId::PositionUpdate,
            Self::Message(_) => ClientPacketId::Message,
        }
    }

    /// Encodes the packet exactly as a client would put it on the wire.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let id = self.id();
        let mut buf = vec![0u8; 1 + id.body_len()];
        buf[0] = id as u8;

        match self {
            Self::Hello(hello) => {
                buf[1] = hello.protocol_version;
                write_string(&mut buf[2..66], &hello.name)?;
                write_string(&mut buf[66..130], &hello.verification_key)?;
                // buf[130] is unused.
            }
            Self::SetBlock(set) => {
                write_i16(&mut buf[1..3], set.x);
                write_i16(&mut buf[3..5], set.y);
                write_i16(&mut buf[5..7], set.z);
                buf[7] = set.mode;
                buf[8] = set.block_type;
            }
            Self::PositionUpdate(pos) => {
                // Clients always send 255 (themselves) here.
                buf[1] = 0xff;
                write_i16(&mut buf[2..4], pos.x);
                write_i16(&mut buf[4..6], pos.y);
                write_i16(&mut buf[6..8], pos.z);
                buf[8] = pos.yaw;
                buf[9] = pos.pitch;
            }
            Self::Message(msg) => {
                buf[1] = 0xff;
                write_string(&mut buf[2..66], &msg.text)?;
            }
        }

        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Server packets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    pub name: String,
    pub motd: String,
    pub player_type: PlayerType,
}

/// One slice of the compressed level, with transfer progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDataChunk {
    /// At most [`CHUNK_LEN`] bytes; zero-padded on the wire.
    pub data: Vec<u8>,
    /// Percent complete, 0–100.
    pub percent: u8,
}

impl LevelDataChunk {
    /// Builds a chunk whose progress byte is `floor(100 * sent / total)`.
    ///
    /// # Errors
    /// - [`ProtocolError::ChunkTooLarge`] if `data` exceeds 1024 bytes
    /// - [`ProtocolError::InvalidProgress`] if `sent > total`
    pub fn new(
        data: &[u8],
        sent: usize,
        total: usize,
    ) -> Result<Self, ProtocolError> {
        if data.len() > CHUNK_LEN {
            return Err(ProtocolError::ChunkTooLarge(data.len()));
        }
        Ok(Self {
            data: data.to_vec(),
            percent: percent_complete(sent, total)?,
        })
    }
}

/// Computes `floor(100 * sent / total)` without floating point.
///
/// An empty transfer (`total == 0`) reports 0%.
pub fn percent_complete(sent: usize, total: usize) -> Result<u8, ProtocolError> {
    if sent > total {
        return Err(ProtocolError::InvalidProgress { sent, total });
    }
    if total == 0 {
        return Ok(0);
    }
    // sent <= total, so the quotient is at most 100.
    let percent = (sent as u128 * 100) / total as u128;
    Ok(percent as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFinalize {
    pub width: i16,
    pub depth: i16,
    pub height: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPlayer {
    pub player_id: i8,
    pub name: String,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub yaw: u8,
    pub pitch: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMessage {
    pub sender: i8,
    pub text: String,
}

/// A server → client packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    Hello(ServerHello),
    LevelInit,
    LevelDataChunk(LevelDataChunk),
    LevelFinalize(LevelFinalize),
    SpawnPlayer(SpawnPlayer),
    Message(ServerMessage),
    Kick { reason: String },
}

impl ServerPacket {
    /// Returns the packet's wire ID.
    pub fn id(&self) -> ServerPacketId {
        match self {
            Self::Hello(_) => ServerPacketId::Hello,
            Self::LevelInit => ServerPacketId::LevelInit,
            Self::LevelDataChunk(_) => ServerPacketId::LevelDataChunk,
            Self::LevelFinalize(_) => ServerPacketId::LevelFinalize,
            Self::SpawnPlayer(_) => ServerPacketId::SpawnPlayer,
            Self::Message(_) => ServerPacketId::Message,
            Self::Kick { .. } => ServerPacketId::Kick,
        }
    }

    /// Encodes the packet into a buffer of its exact wire size.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let id = self.id();
        let mut buf = vec![0u8; 1 + id.body_len()];
        buf[0] = id as u8;

        match self {
            Self::Hello(hello) => {
                buf[1] = PROTOCOL_VERSION;
                write_string(&mut buf[2..66], &hello.name)?;
                write_string(&mut buf[66..130], &hello.motd)?;
                buf[130] = hello.player_type.0;
            }
            Self::LevelInit => {}
            Self::LevelDataChunk(chunk) => {
                let len = chunk.data.len();
                if len > CHUNK_LEN {
                    return Err(ProtocolError::ChunkTooLarge(len));
                }
                // len <= 1024 always fits in an i16.
                write_i16(&mut buf[1..3], len as i16);
                // The rest of the payload stays zeroed.
                buf[3..3 + len].copy_from_slice(&chunk.data);
                buf[3 + CHUNK_LEN] = chunk.percent;
            }
            Self::LevelFinalize(fin) => {
                write_i16(&mut buf[1..3], fin.width);
                write_i16(&mut buf[3..5], fin.depth);
                write_i16(&mut buf[5..7], fin.height);
            }
            Self::SpawnPlayer(spawn) => {
                buf[1] = spawn.player_id as u8;
                write_string(&mut buf[2..66], &spawn.name)?;
                write_i16(&mut buf[66..68], spawn.x);
                write_i16(&mut buf[68..70], spawn.y);
                write_i16(&mut buf[70..72], spawn.z);
                buf[72] = spawn.yaw;
                buf[73] = spawn.pitch;
            }
            Self::Message(msg) => {
                buf[1] = msg.sender as u8;
                write_string(&mut buf[2..66], &msg.text)?;
            }
            Self::Kick { reason } => {
                write_string(&mut buf[1..65], reason)?;
            }
        }

        Ok(buf)
    }
}
