// ============================================================================
// superview-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// Abstractions for spawning and supervising the ffmpeg encode process. The
// orchestrator only sees the two traits below, which lets tests substitute a
// scripted process for the real binary.
//
// KEY COMPONENTS:
// - FfmpegProcess: an active ffmpeg process with its two output pipes
// - FfmpegSpawner: creates a process from an argument list
// - SidecarSpawner: concrete implementation using ffmpeg-sidecar

use std::io::Read;
use std::process::ExitStatus;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;

use crate::error::{CoreError, CoreResult};

/// Readable end of one of the child's output pipes.
pub type PipeReader = Box<dyn Read + Send + 'static>;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
///
/// The owner of the process is the only one allowed to call [`kill`] and
/// [`wait`]; the pipes are handed out once so they can be drained on other
/// threads.
///
/// [`kill`]: FfmpegProcess::kill
/// [`wait`]: FfmpegProcess::wait
pub trait FfmpegProcess {
    /// Takes the stream carrying `-progress pipe:1` output (stdout).
    fn take_progress(&mut self) -> Option<PipeReader>;

    /// Takes the diagnostic stream (stderr).
    fn take_diagnostics(&mut self) -> Option<PipeReader>;

    /// Forcibly terminates the process.
    fn kill(&mut self) -> CoreResult<()>;

    /// Waits for the process to exit and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an [`FfmpegProcess`].
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns ffmpeg with `args` (everything after the program name).
    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn take_progress(&mut self) -> Option<PipeReader> {
        self.0.take_stdout().map(|s| Box::new(s) as PipeReader)
    }

    fn take_diagnostics(&mut self) -> Option<PipeReader> {
        self.0.take_stderr().map(|s| Box::new(s) as PipeReader)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.0.kill().map_err(CoreError::Io)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(CoreError::Io)
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        let mut cmd = FfmpegCommand::new();
        cmd.args(args);
        log::debug!("Spawning ffmpeg: {:?}", cmd);
        cmd.spawn().map(SidecarProcess).map_err(|e| {
            log::error!("Failed to start ffmpeg: {}", e);
            CoreError::EncodeSpawnFailed(e.to_string())
        })
    }
}
