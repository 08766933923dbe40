// ============================================================================
// superview-core/src/encode/mod.rs
// ============================================================================
//
// ENCODING: Applying the remap with ffmpeg
//
// - job: the encode request and its lifecycle
// - command: ffmpeg argument construction
// - progress: `-progress` stream parsing and percentage mapping
// - orchestrator: process supervision, progress streaming, cancellation

pub mod command;
pub mod job;
pub mod orchestrator;
pub mod progress;

pub use command::{VideoFilterChain, build_encode_args};
pub use job::{EncodeJob, JobState};
pub use orchestrator::{EncodeOutcome, EncodeRun, POLL_INTERVAL, run, start};
pub use progress::{
    EncodeProgress, PROGRESS_LOG_TARGET, ProgressLogger, parse_out_time_ms, progress_percent,
};
