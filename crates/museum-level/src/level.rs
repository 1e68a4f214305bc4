//! Level snapshots and the on-disk level file format.
//!
//! A level file is one gzip stream:
//!
//! ```text
//! width:i16 depth:i16 height:i16 spawn_x:i16 spawn_y:i16 spawn_z:i16
//! blocks: width * depth * height bytes
//! ```
//!
//! All integers are big-endian. Spawn coordinates are in the protocol's
//! fixed-point units (32 per block), ready to put in a spawn packet.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use museum_protocol::bytes::read_i16;

use crate::LevelError;

/// Where the player appears when a level is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spawnpoint {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub yaw: u8,
    pub pitch: u8,
}

/// An immutable voxel world snapshot.
///
/// The block array always holds exactly `width * depth * height` entries;
/// [`Level::new`] refuses anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    blocks: Vec<u8>,
    width: i16,
    depth: i16,
    height: i16,
    spawn: Spawnpoint,
}

impl Level {
    /// Builds a level, checking the block array against the dimensions.
    pub fn new(
        width: i16,
        depth: i16,
        height: i16,
        spawn: Spawnpoint,
        blocks: Vec<u8>,
    ) -> Result<Self, LevelError> {
        let expected = volume(width, depth, height)?;
        if blocks.len() != expected {
            return Err(LevelError::BlockCountMismatch {
                expected,
                actual: blocks.len(),
            });
        }
        Ok(Self {
            blocks,
            width,
            depth,
            height,
            spawn,
        })
    }

    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn depth(&self) -> i16 {
        self.depth
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn spawn(&self) -> Spawnpoint {
        self.spawn
    }
}

/// Number of blocks in a level of the given size.
///
/// The transfer format prefixes the block array with its length as an
/// `i32`, so larger volumes are rejected here rather than mid-transfer.
fn volume(width: i16, depth: i16, height: i16) -> Result<usize, LevelError> {
    let invalid = || LevelError::InvalidDimensions {
        width,
        depth,
        height,
    };
    if width < 0 || depth < 0 || height < 0 {
        return Err(invalid());
    }
    let volume = width as i64 * depth as i64 * height as i64;
    if volume > i32::MAX as i64 {
        return Err(invalid());
    }
    Ok(volume as usize)
}

/// Decodes a gzip-compressed level stream.
///
/// # Errors
/// - [`LevelError::Header`] if a header field is short
/// - [`LevelError::InvalidDimensions`] for negative or oversized levels
/// - [`LevelError::Truncated`] if the stream ends before the last block
pub fn decode_level<R: Read>(reader: R) -> Result<Level, LevelError> {
    let mut gz = GzDecoder::new(reader);

    let width = read_i16(&mut gz)?;
    let depth = read_i16(&mut gz)?;
    let height = read_i16(&mut gz)?;

    let spawn = Spawnpoint {
        x: read_i16(&mut gz)?,
        y: read_i16(&mut gz)?,
        z: read_i16(&mut gz)?,
        yaw: 0,
        pitch: 0,
    };

    let expected = volume(width, depth, height)?;
    let mut blocks = vec![0u8; expected];
    let mut filled = 0;
    while filled < expected {
        let n = gz.read(&mut blocks[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled < expected {
        return Err(LevelError::Truncated {
            expected,
            actual: filled,
        });
    }

    Level::new(width, depth, height, spawn, blocks)
}

/// Opens and decodes a level file.
pub fn read_level(path: &Path) -> Result<Level, LevelError> {
    let file = File::open(path)?;
    let level = decode_level(file)?;

    tracing::info!(
        path = %path.display(),
        width = level.width,
        depth = level.depth,
        height = level.height,
        "loaded level"
    );

    Ok(level)
}

/// Writes `level` in the level file format.
///
/// Spawn orientation is not part of the format and is dropped.
pub fn encode_level<W: Write>(level: &Level, writer: W) -> Result<W, LevelError> {
    let mut gz = GzEncoder::new(writer, Compression::default());
    for value in [
        level.width,
        level.depth,
        level.height,
        level.spawn.x,
        level.spawn.y,
        level.spawn.z,
    ] {
        gz.write_all(&value.to_be_bytes())?;
    }
    gz.write_all(&level.blocks)?;
    Ok(gz.finish()?)
}
