//! Error types for the level layer.

use museum_protocol::ProtocolError;

/// Errors that can occur while resolving or loading levels.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// No level with this name is in the store (or the store is empty).
    #[error("level not found: {0}")]
    NotFound(String),

    /// The level file ended before all of its blocks were read.
    #[error("level file too short: expected {expected} blocks, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Dimensions are negative, or the block count doesn't fit the
    /// 32-bit size prefix used during transfer.
    #[error("invalid level dimensions {width}x{depth}x{height}")]
    InvalidDimensions { width: i16, depth: i16, height: i16 },

    /// The block array length doesn't match the dimensions.
    #[error("block array has {actual} entries, dimensions need {expected}")]
    BlockCountMismatch { expected: usize, actual: usize },

    /// The level file header couldn't be read.
    #[error("bad level header: {0}")]
    Header(#[from] ProtocolError),

    /// A manifest record didn't have exactly three columns.
    #[error("manifest file is corrupt: record {record} has {columns} columns")]
    CorruptManifest { record: usize, columns: usize },

    /// The manifest couldn't be parsed as CSV.
    #[error("manifest parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Opening or reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LevelError {
    /// Returns `true` if the error means "no such level" rather than
    /// "the level exists but couldn't be loaded".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
