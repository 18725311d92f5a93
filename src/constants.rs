use std::time::Duration;

pub const MIB: u64 = 1024 * 1024;

/// Prefix and extension for generated chunk files.
pub const CHUNK_FILE_PREFIX: &str = "data_chunk_";
pub const CHUNK_FILE_EXT: &str = "dat";

/// Zero-padding width for chunk sequence numbers, so lexicographic name
/// order matches creation order.
pub const CHUNK_INDEX_WIDTH: usize = 5;

/// How long `clear()` waits for the write loop to reach idle before
/// deleting files anyway.
pub const CLEAR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval while waiting for the write loop to go idle.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Capacity of the bounded progress channel; overflow drops snapshots.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 8;

/// Default number of entries returned when listing recent files.
pub const RECENT_FILES_LIMIT: usize = 10;
