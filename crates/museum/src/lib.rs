//! # Museum
//!
//! A read-only server for the classic (version 7) protocol. Players join,
//! land in the default level of a CSV manifest, and can warp between
//! archived levels with chat commands. Nothing they do is saved.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use museum::prelude::*;
//!
//! # async fn start() -> Result<(), MuseumError> {
//! let store = Museum::from_manifest("manifest.csv".as_ref())?;
//! let server = MuseumServer::<Museum>::builder()
//!     .bind("0.0.0.0:25565")
//!     .session_config(SessionConfig {
//!         server_name: "My Museum".into(),
//!         ..SessionConfig::default()
//!     })
//!     .build(store)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
pub mod heartbeat;
mod server;
pub mod tracker;

pub use error::MuseumError;
pub use server::{MuseumServer, MuseumServerBuilder};

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::heartbeat::Heartbeat;
    pub use crate::tracker::TrackerHandle;
    pub use crate::{MuseumError, MuseumServer, MuseumServerBuilder};
    pub use museum_level::{Level, LevelDescriptor, LevelError, LevelStore, Museum};
    pub use museum_session::{SessionConfig, SessionError};
}
