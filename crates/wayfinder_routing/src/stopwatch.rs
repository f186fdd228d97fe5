use std::time::{Duration, Instant};

use tracing::debug;

/// Times a named phase and logs it at DEBUG level.
pub(crate) struct Stopwatch {
    name: &'static str,
    started: Instant,
    last_lap: Instant,
}

impl Stopwatch {
    pub fn start(name: &'static str) -> Self {
        let now = Instant::now();
        Self {
            name,
            started: now,
            last_lap: now,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the time since the previous lap.
    pub fn lap(&mut self, phase: &str) {
        let now = Instant::now();
        debug!(
            stopwatch = self.name,
            phase,
            elapsed = ?now.duration_since(self.last_lap)
        );
        self.last_lap = now;
    }

    pub fn report(&self) {
        debug!(stopwatch = self.name, elapsed = ?self.elapsed(), "done");
    }
}
