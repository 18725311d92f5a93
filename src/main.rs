use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use diskfill::constants::RECENT_FILES_LIMIT;
use diskfill::controller::{FillController, ProgressReporter, ProgressSnapshot};
use diskfill::{cli, config, logging, util};

/// Logs progress snapshots, throttled to the configured interval.
struct LogReporter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl LogReporter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }
}

impl ProgressReporter for LogReporter {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        let mut last = self.last.lock().expect("reporter lock");
        let due = last.is_none_or(|at| at.elapsed() >= self.interval);
        if due {
            info!(
                "progress: {} bytes on disk across {} chunk files (state={:?})",
                snapshot.current_size_bytes, snapshot.files_created, snapshot.state
            );
            *last = Some(Instant::now());
        }
    }
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let mut cfg = config::load_config(cli_opts.config_path.as_deref())?;
    if let Some(target_size_mib) = cli_opts.target_size_mib {
        cfg.target_size_mib = target_size_mib;
    }
    if let Some(chunk_size_mib) = cli_opts.chunk_size_mib {
        cfg.chunk_size_mib = chunk_size_mib;
    }
    if let Some(sub_chunk_mib) = cli_opts.sub_chunk_mib {
        cfg.sub_chunk_mib = sub_chunk_mib;
    }

    util::ensure_target_dir(&cli_opts.dir)?;

    if cli_opts.clear {
        let controller = FillController::new(cli_opts.dir.clone(), None);
        let report = controller.clear();
        for error in &report.errors {
            warn!("clear error: {error}");
        }
        info!(
            "clear finished: {} files removed, {} bytes freed",
            report.files_removed, report.bytes_freed
        );
        return Ok(());
    }

    let fill_cfg = cfg.fill_config()?;
    info!(
        "starting run_id={} dir={} target_mib={} chunk_mib={} sub_chunk_mib={}",
        cfg.run_id,
        cli_opts.dir.display(),
        cfg.target_size_mib,
        cfg.chunk_size_mib,
        cfg.sub_chunk_mib
    );

    let reporter: Arc<dyn ProgressReporter> = Arc::new(LogReporter::new(Duration::from_secs(
        cli_opts.progress_interval_secs,
    )));
    let controller = FillController::new(cli_opts.dir.clone(), Some(reporter));

    let ctrlc_controller = controller.clone();
    ctrlc::set_handler(move || {
        info!("interrupt received; requesting stop");
        ctrlc_controller.stop();
    })?;

    controller.start(fill_cfg);
    while !controller.wait_until_idle(Duration::from_millis(500)) {}

    let snapshot = controller.snapshot();
    info!(
        "fill finished: {} bytes across {} chunk files",
        snapshot.current_size_bytes, snapshot.files_created
    );
    for record in controller.list_recent_files(RECENT_FILES_LIMIT) {
        info!("  {} ({} bytes)", record.name, record.size_bytes);
    }

    Ok(())
}
