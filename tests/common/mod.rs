#![allow(dead_code)]

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use diskfill::controller::{ProgressReporter, ProgressSnapshot};

/// Reporter that sleeps on every tick, keeping test runs alive long enough
/// to observe them mid-flight.
pub struct SlowReporter {
    pub delay: Duration,
}

impl ProgressReporter for SlowReporter {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {
        thread::sleep(self.delay);
    }
}

/// Reporter that records every published snapshot.
pub struct CollectingReporter {
    pub snapshots: Mutex<Vec<ProgressSnapshot>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(Vec::new()),
        }
    }
}

impl ProgressReporter for CollectingReporter {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.snapshots
            .lock()
            .expect("snapshot lock")
            .push(snapshot.clone());
    }
}
