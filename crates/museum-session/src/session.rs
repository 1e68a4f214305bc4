//! The per-connection state machine.
//!
//! ```text
//!   AwaitingHello ──(valid Hello, level sent)──→ Active ──(EOF / error)──→ Closed
//!        │                                                                   ↑
//!        └──────────────(bad first packet, version, level load)──────────────┘
//! ```
//!
//! A session owns both halves of its connection. It reads one packet at
//! a time and answers before reading the next, so every reply to a
//! command goes out in order and nothing else ever writes to the socket.

use std::sync::Arc;

use museum_level::{Level, LevelDescriptor, LevelError, LevelStore};
use museum_protocol::{
    ClientDecoder, ClientPacket, ClientPacketId, PlayerType, ProtocolError,
    ServerEncoder,
};
use museum_transport::ConnectionId;
use rand::seq::IndexedRandom;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::chat::send_message;
use crate::command::{self, Command};
use crate::transfer::send_level;
use crate::{SessionConfig, SessionError};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for the client's Hello.
    AwaitingHello,
    /// Handshake done and a level has been sent.
    Active,
    /// The connection has been shut down.
    Closed,
}

/// One client connection from handshake to close.
pub struct Session<R, W, S> {
    conn_id: ConnectionId,
    decoder: ClientDecoder<R>,
    encoder: ServerEncoder<W>,
    store: Arc<S>,
    config: Arc<SessionConfig>,
    state: SessionState,
    /// Set once by the handshake.
    name: String,
    warned_set_block: bool,
}

impl<R, W, S> Session<R, W, S>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: LevelStore,
{
    pub fn new(
        conn_id: ConnectionId,
        reader: R,
        writer: W,
        store: Arc<S>,
        config: Arc<SessionConfig>,
    ) -> Self {
        Self {
            conn_id,
            decoder: ClientDecoder::new(reader),
            encoder: ServerEncoder::new(writer),
            store,
            config,
            state: SessionState::AwaitingHello,
            name: String::new(),
            warned_set_block: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session until the client leaves or something fails.
    ///
    /// Whatever happens, the write half is shut down exactly once before
    /// this returns. A client disconnecting or going idle is `Ok`; any
    /// other end is reported as an error after being logged.
    pub async fn run(mut self) -> Result<(), SessionError> {
        let conn_id = self.conn_id;
        let result = self.drive().await;

        match &result {
            Ok(()) => {}
            Err(e @ (SessionError::Protocol(_) | SessionError::UnexpectedPacket(_))) => {
                tracing::info!(%conn_id, player = %self.name, error = %e, "protocol error");
            }
            Err(e) => {
                tracing::error!(%conn_id, player = %self.name, error = %e, "session failed");
            }
        }

        self.close().await;
        tracing::info!(%conn_id, player = %self.name, "Closing connection");
        result
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        self.handshake().await?;
        self.enter_default_level().await?;
        self.state = SessionState::Active;

        self.send_about().await?;
        self.serve().await
    }

    async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        if let Err(e) = self.encoder.get_mut().shutdown().await {
            tracing::debug!(conn_id = %self.conn_id, error = %e, "shutdown failed");
        }
    }

    /// Reads the client's Hello and answers with the server's.
    ///
    /// Nothing is sent if the first packet isn't a valid Hello.
    async fn handshake(&mut self) -> Result<(), SessionError> {
        let id = self.decoder.next_packet_id().await?;
        if id != ClientPacketId::Hello {
            return Err(SessionError::UnexpectedPacket(id));
        }
        let hello = self.decoder.read_client_hello().await?;
        self.name = hello.name;

        tracing::info!(conn_id = %self.conn_id, player = %self.name, "player joined");

        self.encoder
            .write_server_hello(
                &self.config.server_name,
                &self.config.motd,
                PlayerType::OPERATOR,
            )
            .await?;
        Ok(())
    }

    /// Sends the store's default level, kicking the client if there is
    /// none or it can't be loaded.
    async fn enter_default_level(&mut self) -> Result<(), SessionError> {
        let loaded = match self.store.default_level() {
            Ok(descriptor) => self
                .load_level(&descriptor)
                .await
                .map(|level| (descriptor, level)),
            Err(e) => Err(e.into()),
        };

        match loaded {
            Ok((descriptor, level)) => self.enter_level(&descriptor, &level).await,
            Err(e) => {
                self.encoder.write_kick(command::KICK_LOAD_FAILED).await?;
                Err(e)
            }
        }
    }

    /// Decodes a level file on the blocking thread pool.
    async fn load_level(&self, descriptor: &LevelDescriptor) -> Result<Level, SessionError> {
        let store = Arc::clone(&self.store);
        let descriptor = descriptor.clone();
        let level = tokio::task::spawn_blocking(move || store.load(&descriptor)).await??;
        Ok(level)
    }

    async fn enter_level(
        &mut self,
        descriptor: &LevelDescriptor,
        level: &Level,
    ) -> Result<(), SessionError> {
        send_level(&mut self.encoder, level, descriptor, &self.name).await?;
        tracing::info!(
            conn_id = %self.conn_id,
            player = %self.name,
            level = %descriptor.name,
            "entered level"
        );
        Ok(())
    }

    /// Waits for the next packet ID, giving up after the idle timeout.
    ///
    /// `Ok(None)` means the client went quiet for too long.
    async fn next_packet_id(&mut self) -> Result<Option<ClientPacketId>, ProtocolError> {
        let Some(limit) = self.config.idle_timeout else {
            return self.decoder.next_packet_id().await.map(Some);
        };
        match tokio::time::timeout(limit, self.decoder.next_packet_id()).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                tracing::info!(conn_id = %self.conn_id, player = %self.name, "connection idle");
                Ok(None)
            }
        }
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        loop {
            let id = match self.next_packet_id().await {
                Ok(Some(id)) => id,
                Ok(None) => return Ok(()),
                Err(ProtocolError::Closed) => {
                    tracing::debug!(conn_id = %self.conn_id, "client closed connection");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let packet = self.decoder.read_packet(id).await?;
            self.dispatch(packet).await?;
        }
    }

    async fn dispatch(&mut self, packet: ClientPacket) -> Result<(), SessionError> {
        match packet {
            // A repeated Hello or a position report needs no answer.
            ClientPacket::Hello(_) | ClientPacket::PositionUpdate(_) => Ok(()),
            ClientPacket::SetBlock(_) => {
                if !self.warned_set_block {
                    self.message(command::SET_BLOCK_NOTICE).await?;
                    self.warned_set_block = true;
                }
                Ok(())
            }
            ClientPacket::Message(chat) => {
                if chat.text.starts_with('/') {
                    self.handle_command(&chat.text).await
                } else {
                    self.message(command::CHAT_DISABLED).await
                }
            }
        }
    }

    async fn handle_command(&mut self, text: &str) -> Result<(), SessionError> {
        tracing::debug!(conn_id = %self.conn_id, player = %self.name, command = text, "command");

        match Command::parse(text) {
            Command::Help => {
                for line in command::HELP {
                    self.message(line).await?;
                }
                Ok(())
            }
            Command::About => self.send_about().await,
            Command::Levels => {
                let names = self.store.list_names();
                self.message(&command::levels_list(&names)).await
            }
            Command::Goto(None) => self.message(command::GOTO_USAGE).await,
            Command::Goto(Some(name)) => match self.store.lookup(name) {
                Ok(descriptor) => self.visit(descriptor).await,
                Err(e) if e.is_not_found() => self.message(&command::unknown_level(name)).await,
                Err(e) => {
                    tracing::error!(conn_id = %self.conn_id, level = name, error = %e, "lookup failed");
                    self.message(command::LOCATE_FAILED).await
                }
            },
            Command::Random => {
                let names = self.store.list_names();
                let picked = names
                    .choose(&mut rand::rng())
                    .ok_or_else(|| LevelError::NotFound("<random>".into()))
                    .and_then(|name| self.store.lookup(name));
                match picked {
                    Ok(descriptor) => self.visit(descriptor).await,
                    Err(e) => {
                        tracing::error!(conn_id = %self.conn_id, error = %e, "random level lookup failed");
                        self.message(command::LOCATE_FAILED).await
                    }
                }
            }
            Command::Unknown(token) => self.message(&command::unknown_command(token)).await,
        }
    }

    /// Moves the player to another level.
    ///
    /// The level is loaded before anything is sent, so a level that fails
    /// to load leaves the player where they are.
    async fn visit(&mut self, descriptor: LevelDescriptor) -> Result<(), SessionError> {
        let level = match self.load_level(&descriptor).await {
            Ok(level) => level,
            Err(e) => {
                tracing::error!(
                    conn_id = %self.conn_id,
                    level = %descriptor.name,
                    error = %e,
                    "failed to load level"
                );
                return self.message(&command::load_failed(&descriptor.name)).await;
            }
        };
        self.enter_level(&descriptor, &level).await
    }

    async fn send_about(&mut self) -> Result<(), SessionError> {
        for line in command::about(&self.config.server_name) {
            self.message(&line).await?;
        }
        Ok(())
    }

    async fn message(&mut self, text: &str) -> Result<(), SessionError> {
        send_message(&mut self.encoder, text).await?;
        Ok(())
    }
}
