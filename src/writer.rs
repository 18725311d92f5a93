//! Chunk file writer.
//!
//! Writes one chunk file in bounded sub-writes. Each sub-write is flushed
//! before the progress callback runs, and the stop check between sub-writes
//! is the only cancellation point inside a chunk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::generator;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sub-chunk size must be positive")]
    ZeroSubChunk,
}

/// How a chunk write ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Completed,
    Cancelled,
}

/// Create/truncate the file at `path` and write `total_bytes` of generated
/// data in sub-writes of at most `sub_chunk_bytes`.
///
/// After every flushed sub-write, `on_progress` is invoked and then
/// `should_stop` is consulted; a pending stop request ends the write early
/// with [`ChunkOutcome::Cancelled`], leaving the partial file in place. The
/// first create/write/flush failure aborts immediately with the partial
/// file left behind; there is no retry or rollback.
pub fn write_chunk(
    path: &Path,
    total_bytes: u64,
    sub_chunk_bytes: u64,
    should_stop: &dyn Fn() -> bool,
    on_progress: &mut dyn FnMut(),
) -> Result<ChunkOutcome, WriteError> {
    if sub_chunk_bytes == 0 {
        return Err(WriteError::ZeroSubChunk);
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut remaining = total_bytes;
    while remaining > 0 {
        let write_size = sub_chunk_bytes.min(remaining);
        let data = generator::generate(write_size as usize);
        writer.write_all(&data)?;
        writer.flush()?;
        remaining -= write_size;
        on_progress();
        if remaining > 0 && should_stop() {
            return Ok(ChunkOutcome::Cancelled);
        }
    }

    Ok(ChunkOutcome::Completed)
}
