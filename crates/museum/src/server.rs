//! `MuseumServer` builder and accept loop.
//!
//! Ties the layers together: transport → session, with the level store
//! and config shared by every session and the tracker counting them.

use std::sync::Arc;

use museum_level::LevelStore;
use museum_session::{Session, SessionConfig};
use museum_transport::{TcpTransport, Transport};

use crate::heartbeat::Heartbeat;
use crate::tracker::{TrackerHandle, spawn_tracker};
use crate::MuseumError;

/// Builder for configuring and starting a museum server.
///
/// # Example
///
/// ```rust,ignore
/// use museum::prelude::*;
///
/// let store = Museum::from_manifest("manifest.csv".as_ref())?;
/// let server = MuseumServer::builder()
///     .bind("0.0.0.0:25565")
///     .build(store)
///     .await?;
/// server.run().await
/// ```
pub struct MuseumServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    heartbeat: Option<Heartbeat>,
}

impl MuseumServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:25565".to_string(),
            session_config: SessionConfig::default(),
            heartbeat: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every session runs with.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Announces the server to the server list.
    pub fn heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = Some(heartbeat);
        self
    }

    /// Binds the listener and starts the connection tracker.
    ///
    /// With a heartbeat configured, the first announce is sent here and
    /// must succeed; later announces only log their failures.
    pub async fn build<S: LevelStore>(self, store: S) -> Result<MuseumServer<S>, MuseumError> {
        self.session_config.validate()?;

        let transport = TcpTransport::bind(&self.bind_addr).await?;

        if let Some(heartbeat) = &self.heartbeat {
            tracing::info!("Sending initial heartbeat");
            let play_url = heartbeat.send(0).await?;
            tracing::info!(%play_url, "Play URL");
        }

        Ok(MuseumServer {
            transport,
            store: Arc::new(store),
            config: Arc::new(self.session_config),
            tracker: spawn_tracker(self.heartbeat),
        })
    }
}

impl Default for MuseumServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound museum server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MuseumServer<S> {
    transport: TcpTransport,
    store: Arc<S>,
    config: Arc<SessionConfig>,
    tracker: TrackerHandle,
}

impl<S: LevelStore> MuseumServer<S> {
    /// Creates a new builder.
    pub fn builder() -> MuseumServerBuilder {
        MuseumServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the connection tracker, for reading the live count.
    pub fn tracker(&self) -> TrackerHandle {
        self.tracker.clone()
    }

    /// Runs the accept loop.
    ///
    /// Each connection gets its own task running a [`Session`]. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), MuseumError> {
        tracing::info!(addr = ?self.local_addr().ok(), "museum server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let guard = self.tracker.connected();
                    let conn_id = conn.id();
                    let peer = conn.peer_addr();
                    let (reader, writer) = conn.into_split();

                    let session = Session::new(
                        conn_id,
                        reader,
                        writer,
                        Arc::clone(&self.store),
                        Arc::clone(&self.config),
                    );

                    tokio::spawn(async move {
                        let _guard = guard;
                        if let Err(e) = session.run().await {
                            tracing::debug!(
                                %conn_id,
                                %peer,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
