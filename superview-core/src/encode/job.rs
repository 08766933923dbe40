// ============================================================================
// superview-core/src/encode/job.rs
// ============================================================================
//
// ENCODE JOB: The single active encode and its lifecycle
//
// Pending -> Running -> { Completed | Failed | Cancelled }
// Pending -> Failed            (ffmpeg could not be started)
// Pending -> Cancelled         (cancelled before spawn)
//
// Terminal states never change again.

use std::fmt;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::external::VideoSpec;

/// Lifecycle state of an [`EncodeJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    fn can_move_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One encode request: what to encode, with which encoder, to where.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub spec: VideoSpec,
    pub encoder_name: String,
    /// Zero lets the encoder choose
    pub bitrate_bps: u64,
    pub output_path: PathBuf,
    /// Duration progress is measured against; zero when unknown
    pub duration_secs: f64,
    state: JobState,
}

impl EncodeJob {
    pub fn new(
        spec: VideoSpec,
        encoder_name: impl Into<String>,
        bitrate_bps: u64,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            duration_secs: spec.duration_secs,
            spec,
            encoder_name: encoder_name.into(),
            bitrate_bps,
            output_path: output_path.into(),
            state: JobState::Pending,
        }
    }

    /// Uses `secs` for progress when the probe did not report a duration.
    #[must_use]
    pub fn with_fallback_duration(mut self, secs: Option<f64>) -> Self {
        if self.duration_secs <= 0.0 {
            if let Some(secs) = secs {
                self.duration_secs = secs;
            }
        }
        self
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Moves the job to `next`, rejecting transitions the lifecycle forbids.
    pub fn transition(&mut self, next: JobState) -> CoreResult<()> {
        if !self.state.can_move_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        log::debug!("Encode job {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> EncodeJob {
        let spec = VideoSpec {
            path: PathBuf::from("in.mp4"),
            codec: "h264".to_string(),
            width: 1440,
            height: 1080,
            duration_secs: 10.0,
            bitrate_bps: 1_000_000,
        };
        EncodeJob::new(spec, "libx264", 1_000_000, "out.mp4")
    }

    #[test]
    fn happy_path() {
        let mut job = job();
        assert_eq!(job.state(), JobState::Pending);
        job.transition(JobState::Running).unwrap();
        job.transition(JobState::Completed).unwrap();
        assert!(job.state().is_terminal());
    }

    #[test]
    fn spawn_failure_goes_straight_to_failed() {
        let mut job = job();
        job.transition(JobState::Failed).unwrap();
        assert_eq!(job.state(), JobState::Failed);
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [JobState::Completed, JobState::Failed, JobState::Cancelled] {
            let mut job = job();
            job.transition(JobState::Running).unwrap();
            job.transition(terminal).unwrap();
            let err = job.transition(JobState::Running).unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransition { .. }));
            assert_eq!(job.state(), terminal);
        }
    }

    #[test]
    fn fallback_duration_only_fills_unknown_duration() {
        let probed = job().with_fallback_duration(Some(99.0));
        assert_eq!(probed.duration_secs, 10.0);

        let mut spec = job().spec;
        spec.duration_secs = 0.0;
        let unknown = EncodeJob::new(spec, "libx264", 0, "out.mp4");
        assert_eq!(unknown.clone().with_fallback_duration(None).duration_secs, 0.0);
        assert_eq!(unknown.with_fallback_duration(Some(42.0)).duration_secs, 42.0);
    }

    #[test]
    fn cannot_complete_without_running() {
        let mut job = job();
        let err = job.transition(JobState::Completed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid job state transition: pending -> completed"
        );
    }
}
