//! Sending a level to a client.
//!
//! The transfer payload is the block count as a big-endian `i32`
//! followed by the raw block array, gzip-compressed as one stream. It
//! goes out as:
//!
//! ```text
//! LevelInit
//! LevelDataChunk × ceil(len / 1024)   (percent = bytes sent before / len)
//! LevelFinalize(width, depth, height)
//! SpawnPlayer(-1, player name, spawnpoint, yaw 0, pitch 0)
//! Message "This level is …, from …"
//! ```

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use museum_level::{Level, LevelDescriptor};
use museum_protocol::bytes::write_i32;
use museum_protocol::{CHUNK_LEN, PLAYER_SELF, ServerEncoder};
use tokio::io::AsyncWrite;

use crate::chat::send_message;
use crate::command::level_intro;
use crate::SessionError;

/// Builds the compressed transfer payload for `level`.
pub fn compress_level(level: &Level) -> Result<Vec<u8>, SessionError> {
    let blocks = level.blocks();
    let count =
        i32::try_from(blocks.len()).map_err(|_| SessionError::LevelTooLarge(blocks.len()))?;

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    write_i32(&mut gz, count)?;
    gz.write_all(blocks).map_err(SessionError::Compression)?;
    gz.finish().map_err(SessionError::Compression)
}

/// Sends `level` to the client as the player `player_name`.
///
/// Compression happens before the first packet is written, so a failure
/// there leaves the client where it was.
pub async fn send_level<W>(
    encoder: &mut ServerEncoder<W>,
    level: &Level,
    descriptor: &LevelDescriptor,
    player_name: &str,
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    let payload = compress_level(level)?;
    let total = payload.len();

    encoder.write_level_init().await?;
    for (index, chunk) in payload.chunks(CHUNK_LEN).enumerate() {
        encoder
            .write_level_data_chunk(chunk, index * CHUNK_LEN, total)
            .await?;
    }
    encoder
        .write_level_finalize(level.width(), level.depth(), level.height())
        .await?;

    let spawn = level.spawn();
    encoder
        .write_spawn_player(PLAYER_SELF, player_name, spawn.x, spawn.y, spawn.z, 0, 0)
        .await?;

    send_message(encoder, &level_intro(&descriptor.name, &descriptor.date)).await?;

    tracing::debug!(
        level = %descriptor.name,
        compressed = total,
        chunks = total.div_ceil(CHUNK_LEN),
        "sent level"
    );
    Ok(())
}
