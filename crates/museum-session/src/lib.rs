//! Sessions for the museum server.
//!
//! Every accepted connection runs one [`Session`]: it performs the
//! handshake, sends the starting level, and then answers the player's
//! packets until they leave. Sessions are independent of one another;
//! the only thing they share is the read-only [`LevelStore`] and the
//! [`SessionConfig`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)   ← accepts connections, spawns a task per session
//!     ↕
//! Session (this crate)  ← handshake, commands, level transfer
//!     ↕
//! Protocol + Level (below)  ← packet codecs, level files
//! ```
//!
//! [`LevelStore`]: museum_level::LevelStore

pub mod chat;
pub mod command;
mod config;
mod error;
mod session;
pub mod transfer;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::{Session, SessionState};
