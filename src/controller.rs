//! Fill controller: run state machine and background write loop.
//!
//! One controller owns one target directory. At most one write loop runs at
//! a time, enforced by the atomic idle-gate in [`FillController::start`].
//! Progress is always re-derived from the filesystem rather than counted
//! incrementally, so reported and actual size cannot drift even when a run
//! is stopped mid-chunk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{CLEAR_SHUTDOWN_TIMEOUT, IDLE_POLL_INTERVAL, PROGRESS_CHANNEL_CAPACITY};
use crate::inventory::{self, FileRecord};
use crate::writer::{self, ChunkOutcome};

/// Lifecycle of a fill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Running,
            2 => RunState::Stopping,
            _ => RunState::Idle,
        }
    }
}

/// Parameters of one fill run, captured at start time.
#[derive(Debug, Clone, Copy)]
pub struct FillConfig {
    pub target_size_bytes: u64,
    pub chunk_size_bytes: u64,
    pub sub_chunk_bytes: u64,
}

#[derive(Debug, Error)]
pub enum FillConfigError {
    #[error("target size must be positive")]
    ZeroTarget,
    #[error("chunk size must be positive")]
    ZeroChunk,
    #[error("sub-chunk size must be positive")]
    ZeroSubChunk,
    #[error("sub-chunk size {sub_chunk} exceeds chunk size {chunk}")]
    SubChunkTooLarge { sub_chunk: u64, chunk: u64 },
}

impl FillConfig {
    /// All sizes must be positive and the sub-chunk must fit in a chunk. A
    /// zero chunk size would let the write loop spin on empty files forever.
    pub fn validate(&self) -> Result<(), FillConfigError> {
        if self.target_size_bytes == 0 {
            return Err(FillConfigError::ZeroTarget);
        }
        if self.chunk_size_bytes == 0 {
            return Err(FillConfigError::ZeroChunk);
        }
        if self.sub_chunk_bytes == 0 {
            return Err(FillConfigError::ZeroSubChunk);
        }
        if self.sub_chunk_bytes > self.chunk_size_bytes {
            return Err(FillConfigError::SubChunkTooLarge {
                sub_chunk: self.sub_chunk_bytes,
                chunk: self.chunk_size_bytes,
            });
        }
        Ok(())
    }
}

/// Point-in-time view of a run, derived from filesystem truth.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub state: RunState,
    pub current_size_bytes: u64,
    pub files_created: u64,
}

/// Progress callback for observers of a fill run.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Reporter that pushes snapshots into a bounded channel, dropping them when
/// the receiver lags. Delivery is best-effort; poll
/// [`FillController::snapshot`] for guaranteed reads.
pub struct ChannelReporter {
    tx: Sender<ProgressSnapshot>,
}

impl ChannelReporter {
    pub fn new() -> (Self, Receiver<ProgressSnapshot>) {
        let (tx, rx) = bounded(PROGRESS_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(snapshot.clone()) {
            debug!("progress channel full; dropping snapshot");
        }
    }
}

/// Result of a [`FillController::clear`] call. Per-file deletion failures
/// are collected here, never fatal.
#[derive(Debug, Clone, Default)]
pub struct ClearReport {
    pub files_removed: usize,
    pub bytes_freed: u64,
    pub errors: Vec<String>,
}

struct ControllerInner {
    dir: PathBuf,
    state: AtomicU8,
    handle: Mutex<Option<JoinHandle<()>>>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl ControllerInner {
    fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn snapshot(&self) -> ProgressSnapshot {
        let current_size_bytes = match inventory::total_size_bytes(&self.dir) {
            Ok(size) => size,
            Err(err) => {
                debug!("directory size unavailable: {err}");
                0
            }
        };
        let files_created = match inventory::chunk_file_count(&self.dir) {
            Ok(count) => count,
            Err(err) => {
                debug!("chunk file count unavailable: {err}");
                0
            }
        };
        ProgressSnapshot {
            state: self.state(),
            current_size_bytes,
            files_created,
        }
    }

    fn publish_progress(&self) {
        if let Some(reporter) = &self.reporter {
            reporter.on_progress(&self.snapshot());
        }
    }
}

/// Fills a directory with generated chunk files up to a target size.
///
/// Cheap to clone; clones share the same run state and write loop.
#[derive(Clone)]
pub struct FillController {
    inner: Arc<ControllerInner>,
}

impl FillController {
    pub fn new(dir: PathBuf, reporter: Option<Arc<dyn ProgressReporter>>) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                dir,
                state: AtomicU8::new(RunState::Idle as u8),
                handle: Mutex::new(None),
                reporter,
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Start a fill run with the given parameters. No-op (returning the
    /// current snapshot) unless the controller is idle and the config
    /// validates. Returns immediately; the write loop runs on a dedicated
    /// thread.
    pub fn start(&self, cfg: FillConfig) -> ProgressSnapshot {
        if let Err(err) = cfg.validate() {
            warn!("start rejected: {err}");
            return self.snapshot();
        }
        let gate = self.inner.state.compare_exchange(
            RunState::Idle as u8,
            RunState::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        if gate.is_err() {
            debug!("start ignored; a fill run is already active");
            return self.snapshot();
        }

        info!(
            "starting fill run: target={} chunk={} sub_chunk={} dir={}",
            cfg.target_size_bytes,
            cfg.chunk_size_bytes,
            cfg.sub_chunk_bytes,
            self.inner.dir.display()
        );

        let inner = Arc::clone(&self.inner);
        let handle = thread::spawn(move || write_loop(&inner, cfg));
        let previous = self.inner.handle.lock().expect("handle lock").replace(handle);
        if let Some(previous) = previous {
            // The old loop already reached idle, so this join is immediate.
            let _ = previous.join();
        }

        self.snapshot()
    }

    /// Request cooperative shutdown of the active run. Idempotent,
    /// non-blocking; the loop observes the request after the current
    /// sub-chunk flush.
    pub fn stop(&self) {
        let transitioned = self.inner.state.compare_exchange(
            RunState::Running as u8,
            RunState::Stopping as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        if transitioned.is_ok() {
            info!("stop requested; write loop will exit at the next sub-chunk boundary");
        }
    }

    /// Stop any active run, wait up to the shutdown timeout for it to reach
    /// idle, then delete every regular file in the target directory.
    /// Deletion failures are logged and skipped; the report carries them.
    pub fn clear(&self) -> ClearReport {
        self.stop();
        if self.wait_until_idle(CLEAR_SHUTDOWN_TIMEOUT) {
            if let Some(handle) = self.inner.handle.lock().expect("handle lock").take() {
                let _ = handle.join();
            }
        } else {
            warn!(
                "write loop still running after {:?}; clearing anyway",
                CLEAR_SHUTDOWN_TIMEOUT
            );
        }

        let mut report = ClearReport::default();
        let entries = match std::fs::read_dir(&self.inner.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot list {}: {err}", self.inner.dir.display());
                report.errors.push(err.to_string());
                return report;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report.errors.push(err.to_string());
                    continue;
                }
            };
            let path = entry.path();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if !path.is_file() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    report.files_removed += 1;
                    report.bytes_freed += size;
                }
                Err(err) => {
                    warn!("failed to delete {}: {err}", path.display());
                    report.errors.push(format!("{}: {err}", path.display()));
                }
            }
        }

        info!(
            "cleared {} files ({} bytes freed, {} errors)",
            report.files_removed,
            report.bytes_freed,
            report.errors.len()
        );
        report
    }

    /// Non-blocking derived read of current progress; safe to call from any
    /// thread at any time, including during a run.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.inner.snapshot()
    }

    /// The most recent files in the target directory, newest first.
    pub fn list_recent_files(&self, limit: usize) -> Vec<FileRecord> {
        match inventory::list_files(&self.inner.dir, limit) {
            Ok(records) => records,
            Err(err) => {
                debug!("file listing unavailable: {err}");
                Vec::new()
            }
        }
    }

    /// Poll until the controller reaches idle or `timeout` elapses.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.inner.state() == RunState::Idle {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

fn write_loop(inner: &ControllerInner, cfg: FillConfig) {
    loop {
        if inner.state() != RunState::Running {
            info!("write loop exiting on stop request");
            break;
        }
        let current = match inventory::total_size_bytes(&inner.dir) {
            Ok(size) => size,
            Err(err) => {
                warn!("cannot read size of {}: {err}", inner.dir.display());
                break;
            }
        };
        if current >= cfg.target_size_bytes {
            info!(
                "target reached: {current} bytes on disk >= {} requested",
                cfg.target_size_bytes
            );
            break;
        }
        let index = match inventory::next_chunk_index(&inner.dir) {
            Ok(index) => index,
            Err(err) => {
                warn!("cannot list {}: {err}", inner.dir.display());
                break;
            }
        };
        let path = inner.dir.join(inventory::chunk_file_name(index));

        let should_stop = || inner.state() != RunState::Running;
        let mut on_progress = || inner.publish_progress();
        match writer::write_chunk(
            &path,
            cfg.chunk_size_bytes,
            cfg.sub_chunk_bytes,
            &should_stop,
            &mut on_progress,
        ) {
            Ok(ChunkOutcome::Completed) => {}
            Ok(ChunkOutcome::Cancelled) => {
                info!("chunk write cancelled; partial file left at {}", path.display());
                break;
            }
            Err(err) => {
                warn!("error writing {}: {err}", path.display());
                break;
            }
        }
    }

    // The final snapshot is derived before the idle gate reopens; a racing
    // start must not show up in it.
    let mut final_snapshot = inner.snapshot();
    final_snapshot.state = RunState::Idle;
    inner.state.store(RunState::Idle as u8, Ordering::SeqCst);
    if let Some(reporter) = &inner.reporter {
        reporter.on_progress(&final_snapshot);
    }
}
