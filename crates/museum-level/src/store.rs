//! The level store seam.
//!
//! Sessions never touch the filesystem directly. They go through the
//! [`LevelStore`] trait, which resolves level names to descriptors and
//! descriptors to decoded [`Level`]s. The server ships one
//! implementation, [`Museum`](crate::Museum), backed by a CSV manifest;
//! tests plug in in-memory stores.

use std::path::PathBuf;

use crate::{Level, LevelError, read_level};

/// Metadata for one level in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    /// Display name, also what players type after `/goto`.
    pub name: String,
    /// Where the level file lives.
    pub path: PathBuf,
    /// Human-readable date shown when the level is entered.
    pub date: String,
}

/// Read-only access to a set of levels.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every session task.
/// - `'static` → it lives as long as the server.
pub trait LevelStore: Send + Sync + 'static {
    /// Names of every level, in store order.
    fn list_names(&self) -> Vec<String>;

    /// Finds a level by exact name.
    ///
    /// # Errors
    /// [`LevelError::NotFound`] if no level has this name.
    fn lookup(&self, name: &str) -> Result<LevelDescriptor, LevelError>;

    /// The level every session starts in.
    ///
    /// # Errors
    /// [`LevelError::NotFound`] if the store is empty.
    fn default_level(&self) -> Result<LevelDescriptor, LevelError>;

    /// Decodes the level a descriptor points at.
    ///
    /// The default reads the level file from `descriptor.path`. This does
    /// blocking file I/O; async callers should run it on a blocking thread.
    fn load(&self, descriptor: &LevelDescriptor) -> Result<Level, LevelError> {
        read_level(&descriptor.path)
    }
}
