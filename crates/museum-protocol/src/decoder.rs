//! Server-side packet reader.
//!
//! Reading happens in two steps: [`ClientDecoder::next_packet_id`]
//! validates the ID byte, then one of the `read_*` methods consumes the
//! body for that ID. [`ClientDecoder::read_packet`] does the second step
//! for any validated ID.
//!
//! Each field is filled by exactly one read call. A read that comes back
//! short fails the whole packet with [`ProtocolError::TruncatedRead`]
//! instead of waiting for the rest: once a field is torn there is no way
//! to find the next packet boundary again.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::bytes::{STRING_LEN, read_string};
use crate::types::{
    ChatMessage, ClientHello, ClientPacket, ClientPacketId, PROTOCOL_VERSION,
    PositionUpdate, SetBlock,
};
use crate::ProtocolError;

/// Reads client → server packets from a byte stream.
#[derive(Debug)]
pub struct ClientDecoder<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin> ClientDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    async fn read_field(&mut self, buf: &mut [u8]) -> Result<(), ProtocolError> {
        let n = self.reader.read(buf).await?;
        if n != buf.len() {
            return Err(ProtocolError::TruncatedRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }

    async fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        let mut buf = [0u8; 1];
        self.read_field(&mut buf).await?;
        Ok(buf[0])
    }

    async fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        let mut buf = [0u8; 2];
        self.read_field(&mut buf).await?;
        Ok(i16::from_be_bytes(buf))
    }

    async fn read_string(&mut self) -> Result<String, ProtocolError> {
        let mut buf = [0u8; STRING_LEN];
        self.read_field(&mut buf).await?;
        Ok(read_string(&buf))
    }

    /// Reads and validates the next packet ID.
    ///
    /// # Errors
    /// - [`ProtocolError::Closed`] if the stream ended cleanly
    /// - [`ProtocolError::UnknownPacketId`] for any ID a client may not send
    pub async fn next_packet_id(&mut self) -> Result<ClientPacketId, ProtocolError> {
        let mut buf = [0u8; 1];
        if self.reader.read(&mut buf).await? == 0 {
            return Err(ProtocolError::Closed);
        }
        ClientPacketId::try_from(buf[0])
    }

    /// Reads the body of a packet whose ID was already validated.
    pub async fn read_packet(
        &mut self,
        id: ClientPacketId,
    ) -> Result<ClientPacket, ProtocolError> {
        Ok(match id {
            ClientPacketId::Hello => {
                ClientPacket::Hello(self.read_client_hello().await?)
            }
            ClientPacketId::SetBlock => {
                ClientPacket::SetBlock(self.read_set_block().await?)
            }
            ClientPacketId::PositionUpdate => {
                ClientPacket::PositionUpdate(self.read_position_update().await?)
            }
            ClientPacketId::Message => {
                ClientPacket::Message(self.read_message().await?)
            }
        })
    }

    /// Reads a Hello body, rejecting any protocol version but 7.
    pub async fn read_client_hello(&mut self) -> Result<ClientHello, ProtocolError> {
        let protocol_version = self.read_u8().await?;
        if protocol_version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedProtocolVersion(protocol_version));
        }
        let name = self.read_string().await?;
        let verification_key = self.read_string().await?;
        // Unused byte.
        self.read_u8().await?;

        Ok(ClientHello {
            protocol_version,
            name,
            verification_key,
        })
    }

    pub async fn read_set_block(&mut self) -> Result<SetBlock, ProtocolError> {
        Ok(SetBlock {
            x: self.read_i16().await?,
            y: self.read_i16().await?,
            z: self.read_i16().await?,
            mode: self.read_u8().await?,
            block_type: self.read_u8().await?,
        })
    }

    pub async fn read_position_update(&mut self) -> Result<PositionUpdate, ProtocolError> {
        // Player ID, always 255 from a well-behaved client.
        self.read_u8().await?;
        Ok(PositionUpdate {
            x: self.read_i16().await?,
            y: self.read_i16().await?,
            z: self.read_i16().await?,
            yaw: self.read_u8().await?,
            pitch: self.read_u8().await?,
        })
    }

    pub async fn read_message(&mut self) -> Result<ChatMessage, ProtocolError> {
        // Unused player ID.
        self.read_u8().await?;
        Ok(ChatMessage {
            text: self.read_string().await?,
        })
    }
}
