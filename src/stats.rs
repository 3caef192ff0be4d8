//! Run-long tracking statistics

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Accumulates per-frame outcomes while a session is running.
///
/// Counters only ever grow; there is no windowing or smoothing.
#[derive(Debug, Clone)]
pub struct RunStats {
    total_frames: u64,
    tracked_frames: u64,
    started_at: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            tracked_frames: 0,
            started_at: Instant::now(),
        }
    }

    /// Record the outcome of one tracker update
    pub fn record(&mut self, located: bool) {
        self.total_frames += 1;
        if located {
            self.tracked_frames += 1;
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Consume the accumulator and produce the final report
    pub fn finish(self) -> RunReport {
        RunReport {
            total_frames: self.total_frames,
            tracked_frames: self.tracked_frames,
            elapsed: self.started_at.elapsed(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Final statistics for a completed tracking session
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub total_frames: u64,
    pub tracked_frames: u64,
    pub elapsed: Duration,
}

impl RunReport {
    /// Percentage of frames where the tracker located the target.
    /// Returns 0 when no frames were processed.
    pub fn accuracy(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        100.0 * self.tracked_frames as f64 / self.total_frames as f64
    }

    /// Average frames per second over the whole run.
    /// Returns 0 when the elapsed time is zero.
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_frames as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames: {} | accuracy: {:.2}% | FPS: {:.2}",
            self.total_frames,
            self.accuracy(),
            self.fps()
        )
    }
}
