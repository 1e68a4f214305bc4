//! The client side of the protocol.
//!
//! The server itself never needs these: they exist so tests and tools
//! can talk to a running server the way a game client does. Unlike the
//! server-side [`ClientDecoder`](crate::ClientDecoder), the
//! [`ServerDecoder`] waits for complete fields with `read_exact`.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::bytes::read_string;
use crate::types::{
    CHUNK_LEN, ClientPacket, LevelDataChunk, LevelFinalize, PROTOCOL_VERSION,
    PlayerType, ServerHello, ServerMessage, ServerPacket, ServerPacketId,
    SpawnPlayer,
};
use crate::ProtocolError;

/// Writes client → server packets.
#[derive(Debug)]
pub struct ClientEncoder<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ClientEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub async fn write_packet(
        &mut self,
        packet: &ClientPacket,
    ) -> Result<(), ProtocolError> {
        let buf = packet.encode()?;
        self.writer.write_all(&buf).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Reads server → client packets.
#[derive(Debug)]
pub struct ServerDecoder<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin> ServerDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next complete packet.
    ///
    /// # Errors
    /// - [`ProtocolError::Closed`] if the stream ended between packets
    /// - [`ProtocolError::TruncatedRead`] if it ended inside one
    /// - [`ProtocolError::UnknownPacketId`] for IDs a server never sends
    pub async fn read_packet(&mut self) -> Result<ServerPacket, ProtocolError> {
        let mut id = [0u8; 1];
        if self.reader.read(&mut id).await? == 0 {
            return Err(ProtocolError::Closed);
        }
        let id = ServerPacketId::try_from(id[0])?;

        let mut body = vec![0u8; id.body_len()];
        if let Err(e) = self.reader.read_exact(&mut body).await {
            return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ProtocolError::TruncatedRead {
                    expected: body.len(),
                    actual: 0,
                }
            } else {
                ProtocolError::Io(e)
            });
        }

        decode_server_body(id, &body)
    }
}

fn be_i16(bytes: &[u8]) -> i16 {
    i16::from_be_bytes([bytes[0], bytes[1]])
}

fn decode_server_body(
    id: ServerPacketId,
    body: &[u8],
) -> Result<ServerPacket, ProtocolError> {
    Ok(match id {
        ServerPacketId::Hello => {
            if body[0] != PROTOCOL_VERSION {
                return Err(ProtocolError::UnsupportedProtocolVersion(body[0]));
            }
            ServerPacket::Hello(ServerHello {
                name: read_string(&body[1..65]),
                motd: read_string(&body[65..129]),
                player_type: PlayerType(body[129]),
            })
        }
        ServerPacketId::LevelInit => ServerPacket::LevelInit,
        ServerPacketId::LevelDataChunk => {
            let len = usize::try_from(be_i16(&body[0..2]))
                .map_err(|_| ProtocolError::ChunkTooLarge(usize::MAX))?;
            if len > CHUNK_LEN {
                return Err(ProtocolError::ChunkTooLarge(len));
            }
            ServerPacket::LevelDataChunk(LevelDataChunk {
                data: body[2..2 + len].to_vec(),
                percent: body[2 + CHUNK_LEN],
            })
        }
        ServerPacketId::LevelFinalize => ServerPacket::LevelFinalize(LevelFinalize {
            width: be_i16(&body[0..2]),
            depth: be_i16(&body[2..4]),
            height: be_i16(&body[4..6]),
        }),
        ServerPacketId::SpawnPlayer => ServerPacket::SpawnPlayer(SpawnPlayer {
            player_id: body[0] as i8,
            name: read_string(&body[1..65]),
            x: be_i16(&body[65..67]),
            y: be_i16(&body[67..69]),
            z: be_i16(&body[69..71]),
            yaw: body[71],
            pitch: body[72],
        }),
        ServerPacketId::Message => ServerPacket::Message(ServerMessage {
            sender: body[0] as i8,
            text: read_string(&body[1..65]),
        }),
        ServerPacketId::Kick => ServerPacket::Kick {
            reason: read_string(&body[0..64]),
        },
    })
}
