//! Levels for the museum server.
//!
//! - [`Level`] — an immutable voxel snapshot (blocks, size, spawn)
//! - [`decode_level`] / [`read_level`] — the gzip level file format
//! - [`LevelStore`] — the read-only interface sessions resolve levels
//!   through
//! - [`Museum`] — a [`LevelStore`] backed by a CSV manifest

mod error;
mod level;
mod manifest;
mod store;

pub use error::LevelError;
pub use level::{Level, Spawnpoint, decode_level, encode_level, read_level};
pub use manifest::Museum;
pub use store::{LevelDescriptor, LevelStore};
