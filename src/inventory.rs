//! Directory inventory: derived size and file listings for the target
//! directory, plus the chunk-file naming scheme.
//!
//! Size and counts are always recomputed from the filesystem, never cached,
//! so observers cannot drift from on-disk truth. Only files directly in the
//! directory are considered; the controller never creates subdirectories.

use std::io;
use std::path::Path;

use crate::constants::{CHUNK_FILE_EXT, CHUNK_FILE_PREFIX, CHUNK_INDEX_WIDTH};

/// One file in the target directory, derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size_bytes: u64,
}

/// Sum of the sizes of regular files directly in `dir`.
///
/// A file that disappears between listing and stat counts as 0; concurrent
/// deletion is expected during `clear()`.
pub fn total_size_bytes(dir: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Ok(meta) = entry.metadata() {
            if meta.is_file() {
                total = total.saturating_add(meta.len());
            }
        }
    }
    Ok(total)
}

/// List regular files in `dir`, sorted by name descending, truncated to
/// `limit`. Zero-padded chunk names make this "most recent first".
pub fn list_files(dir: &Path, limit: usize) -> io::Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if !meta.is_file() {
            continue;
        }
        records.push(FileRecord {
            name: entry.file_name().to_string_lossy().to_string(),
            size_bytes: meta.len(),
        });
    }
    records.sort_by(|a, b| b.name.cmp(&a.name));
    records.truncate(limit);
    Ok(records)
}

/// Name for the chunk file with the given sequence number.
pub fn chunk_file_name(index: u64) -> String {
    format!(
        "{CHUNK_FILE_PREFIX}{index:0width$}.{CHUNK_FILE_EXT}",
        width = CHUNK_INDEX_WIDTH
    )
}

/// Parse the sequence number out of a chunk file name. Accepts both padded
/// and unpadded digits.
pub fn parse_chunk_index(name: &str) -> Option<u64> {
    let digits = name
        .strip_prefix(CHUNK_FILE_PREFIX)?
        .strip_suffix(&format!(".{CHUNK_FILE_EXT}"))?;
    digits.parse().ok()
}

/// Number of chunk files currently in `dir`.
pub fn chunk_file_count(dir: &Path) -> io::Result<u64> {
    let mut count = 0u64;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if parse_chunk_index(&entry.file_name().to_string_lossy()).is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// Sequence number for the next chunk file: one past the highest existing
/// index, so survivors of a partial clear are never overwritten.
pub fn next_chunk_index(dir: &Path) -> io::Result<u64> {
    let mut max_index = 0u64;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(index) = parse_chunk_index(&entry.file_name().to_string_lossy()) {
            max_index = max_index.max(index);
        }
    }
    Ok(max_index + 1)
}
