//! Parsing of ffmpeg's `-progress` stream.
//!
//! ffmpeg writes blocks of `key=value` lines; only `out_time_ms` is used. In
//! spite of its name the value is in microseconds, so dividing it by
//! `duration_secs * 10_000` yields a percentage directly.

use serde::Serialize;

/// Log target of the per-10% progress records.
pub const PROGRESS_LOG_TARGET: &str = "superview::progress";

/// One progress update from a running encode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodeProgress {
    /// Encoded media time in microseconds
    pub out_time_us: u64,
    /// Percentage in `[0, 100]`, `None` when the duration is unknown
    pub percent: Option<f64>,
}

impl EncodeProgress {
    pub fn new(out_time_us: u64, duration_secs: f64) -> Self {
        Self {
            out_time_us,
            percent: progress_percent(out_time_us, duration_secs),
        }
    }
}

/// Extracts the `out_time_ms` value from one progress line.
///
/// Other keys and unparsable values (ffmpeg writes `N/A` before the first
/// frame) return `None`.
pub fn parse_out_time_ms(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    if key.trim() != "out_time_ms" {
        return None;
    }
    value.trim().parse::<u64>().ok()
}

/// Maps an `out_time_ms` value to a percentage clamped to `[0, 100]`.
///
/// Returns `None` for a zero, negative or non-finite duration.
pub fn progress_percent(out_time_ms: u64, duration_secs: f64) -> Option<f64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return None;
    }
    let percent = out_time_ms as f64 / (duration_secs * 10_000.0);
    Some(percent.clamp(0.0, 100.0))
}

/// Logs progress each time another 10% boundary is crossed.
#[derive(Debug)]
pub struct ProgressLogger {
    next_threshold: u32,
}

impl Default for ProgressLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressLogger {
    const STEP: u32 = 10;

    pub fn new() -> Self {
        Self {
            next_threshold: Self::STEP,
        }
    }

    /// Records `percent`, logging once per boundary crossed. Returns whether
    /// anything was logged.
    pub fn observe(&mut self, percent: f64) -> bool {
        let mut logged = false;
        while self.next_threshold <= 100 && percent >= f64::from(self.next_threshold) {
            log::info!(target: PROGRESS_LOG_TARGET, "Encoding progress: {}%", self.next_threshold);
            self.next_threshold += Self::STEP;
            logged = true;
        }
        logged
    }
}
