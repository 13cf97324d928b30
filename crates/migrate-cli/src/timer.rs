//! Wall-clock timing of a streamed command.

use std::time::{Duration, Instant};

/// Elapsed times above this many seconds are shown in minutes.
const MINUTES_THRESHOLD_SECS: f64 = 60.0;

/// Measures how long a command ran.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since [`start`](Self::start).
    pub fn duration(&self) -> Duration {
        self.started.elapsed()
    }

    /// Seconds since [`start`](Self::start).
    pub fn elapsed(&self) -> f64 {
        self.duration().as_secs_f64()
    }
}

/// Format an elapsed time: `45.0000 seconds`, or `2.0833 minutes` past a minute.
pub fn format_elapsed(seconds: f64) -> String {
    if seconds > MINUTES_THRESHOLD_SECS {
        format!("{:.4} minutes", seconds / 60.0)
    } else {
        format!("{:.4} seconds", seconds)
    }
}
