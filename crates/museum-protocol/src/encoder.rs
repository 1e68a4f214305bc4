//! Server-side packet writer.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::types::{
    LevelDataChunk, LevelFinalize, PlayerType, ServerHello, ServerMessage,
    ServerPacket, SpawnPlayer,
};
use crate::ProtocolError;

/// Writes server → client packets to a byte stream.
///
/// Every packet is built in full first and then written as one buffer,
/// so a failed encode never leaves half a packet on the wire.
#[derive(Debug)]
pub struct ServerEncoder<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ServerEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes and writes a single packet.
    ///
    /// # Errors
    /// Any encode precondition error from [`ServerPacket::encode`],
    /// [`ProtocolError::ShortWrite`] if the stream stops accepting bytes
    /// before the whole packet is written, or [`ProtocolError::Io`].
    pub async fn write_packet(
        &mut self,
        packet: &ServerPacket,
    ) -> Result<(), ProtocolError> {
        let buf = packet.encode()?;
        self.writer.write_all(&buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::WriteZero {
                ProtocolError::ShortWrite {
                    expected: buf.len(),
                    actual: 0,
                }
            } else {
                ProtocolError::Io(e)
            }
        })?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn write_server_hello(
        &mut self,
        name: &str,
        motd: &str,
        player_type: PlayerType,
    ) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::Hello(ServerHello {
            name: name.to_string(),
            motd: motd.to_string(),
            player_type,
        }))
        .await
    }

    pub async fn write_level_init(&mut self) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::LevelInit).await
    }

    /// Writes one slice of a level transfer.
    ///
    /// `sent` is how many compressed bytes preceded this chunk and
    /// `total` the full compressed size; the client shows the ratio as a
    /// progress bar.
    pub async fn write_level_data_chunk(
        &mut self,
        chunk: &[u8],
        sent: usize,
        total: usize,
    ) -> Result<(), ProtocolError> {
        let chunk = LevelDataChunk::new(chunk, sent, total)?;
        self.write_packet(&ServerPacket::LevelDataChunk(chunk)).await
    }

    pub async fn write_level_finalize(
        &mut self,
        width: i16,
        depth: i16,
        height: i16,
    ) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::LevelFinalize(LevelFinalize {
            width,
            depth,
            height,
        }))
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn write_spawn_player(
        &mut self,
        player_id: i8,
        name: &str,
        x: i16,
        y: i16,
        z: i16,
        yaw: u8,
        pitch: u8,
    ) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::SpawnPlayer(SpawnPlayer {
            player_id,
            name: name.to_string(),
            x,
            y,
            z,
            yaw,
            pitch,
        }))
        .await
    }

    /// Writes a single chat line. `text` must already fit in 64 bytes.
    pub async fn write_message(
        &mut self,
        text: &str,
        sender: i8,
    ) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::Message(ServerMessage {
            sender,
            text: text.to_string(),
        }))
        .await
    }

    pub async fn write_kick(&mut self, reason: &str) -> Result<(), ProtocolError> {
        self.write_packet(&ServerPacket::Kick {
            reason: reason.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SENDER_SERVER;

    #[tokio::test]
    async fn test_writes_exact_packet_bytes() {
        let mut enc = ServerEncoder::new(Vec::new());
        enc.write_level_init().await.unwrap();
        enc.write_level_finalize(1, 2, 3).await.unwrap();
        enc.write_message("hi", SENDER_SERVER).await.unwrap();

        let out = enc.into_inner();
        assert_eq!(out.len(), 1 + 7 + 66);
        assert_eq!(out[0], 0x02);
        assert_eq!(&out[1..8], &[0x04, 0, 1, 0, 2, 0, 3]);
        assert_eq!(out[8], 0x0d);
        assert_eq!(out[9], 0xff);
        assert_eq!(&out[10..12], b"hi");
    }

    #[tokio::test]
    async fn test_failed_encode_writes_nothing() {
        let mut enc = ServerEncoder::new(Vec::new());
        let err = enc
            .write_message(&"x".repeat(80), SENDER_SERVER)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::StringTooLong(80)));

        let err = enc.write_level_data_chunk(&[0; 10], 5, 4).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidProgress { .. }));

        assert!(enc.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_short_write_is_reported() {
        // A writer with room for less than one packet.
        let mut backing = [0u8; 10];
        let mut enc = ServerEncoder::new(std::io::Cursor::new(&mut backing[..]));
        let err = enc.write_kick("too big for the buffer").await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ShortWrite { expected: 65, .. }
        ));
    }
}
