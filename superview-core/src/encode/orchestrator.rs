// ============================================================================
// superview-core/src/encode/orchestrator.rs
// ============================================================================
//
// ENCODE ORCHESTRATOR: Spawning, Progress Streaming and Cancellation
//
// `start` spawns ffmpeg and returns an `EncodeRun`, a finite iterator of
// progress events. Two helper threads drain the child's pipes:
// - the progress reader parses stdout and sends events over a channel
// - the diagnostics reader collects stderr for the error report
//
// The caller's thread owns the child. It alone kills it (when the
// cancellation token is set) and waits on it, so no lock is needed around
// the process handle. While iterating, the token is polled between channel
// receives so a quiet ffmpeg cannot delay cancellation.
//
// `EncodeRun::finish` reaps the child and settles the job state. `run` is the
// callback convenience wrapper used by the pipeline.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::config::AudioMode;
use crate::encode::command::build_encode_args;
use crate::encode::job::{EncodeJob, JobState};
use crate::encode::progress::{EncodeProgress, parse_out_time_ms};
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{FfmpegProcess, FfmpegSpawner, PipeReader};
use crate::remap::MapPaths;

/// How often the cancellation token is checked while waiting for progress.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Summary of a completed encode.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeOutcome {
    pub output_path: PathBuf,
    pub encoder: String,
    pub elapsed: Duration,
    /// Last progress event seen before ffmpeg exited
    pub final_progress: Option<EncodeProgress>,
}

/// A running encode, yielding progress events until ffmpeg closes its
/// progress stream or the run is cancelled.
///
/// Events are "latest known value": ffmpeg may repeat a timestamp, so the
/// sequence is not guaranteed to be strictly increasing. Call [`finish`]
/// after iterating to learn how the encode ended.
///
/// [`finish`]: EncodeRun::finish
pub struct EncodeRun<P: FfmpegProcess> {
    job: EncodeJob,
    process: P,
    events: Receiver<EncodeProgress>,
    progress_reader: Option<JoinHandle<()>>,
    diagnostics_reader: Option<JoinHandle<String>>,
    cancel: CancellationToken,
    started: Instant,
    last: Option<EncodeProgress>,
    stream_closed: bool,
    killed: bool,
    finished: bool,
}

/// Spawns ffmpeg for `job` and returns the running encode.
///
/// The map files must already exist. Fails with
/// [`CoreError::EncodeSpawnFailed`] when ffmpeg cannot be started and with
/// [`CoreError::Cancelled`] when `cancel` is already set.
pub fn start<S: FfmpegSpawner>(
    spawner: &S,
    mut job: EncodeJob,
    maps: &MapPaths,
    audio: AudioMode,
    cancel: CancellationToken,
) -> CoreResult<EncodeRun<S::Process>> {
    if cancel.is_cancelled() {
        job.transition(JobState::Cancelled)?;
        return Err(CoreError::Cancelled);
    }

    let args = build_encode_args(&job, maps, audio);
    log::debug!("ffmpeg {}", args.join(" "));

    let mut process = match spawner.spawn(&args) {
        Ok(process) => process,
        Err(e) => {
            job.transition(JobState::Failed)?;
            return Err(e);
        }
    };
    job.transition(JobState::Running)?;
    log::info!(
        "Encoding {} with {} to {}",
        job.spec.path.display(),
        job.encoder_name,
        job.output_path.display()
    );

    let readers = process
        .take_progress()
        .ok_or_else(|| CoreError::EncodeSpawnFailed("ffmpeg progress stream unavailable".into()))
        .and_then(|progress| {
            let (tx, rx) = unbounded();
            let progress_reader = spawn_progress_reader(progress, tx, job.duration_secs)?;
            let diagnostics_reader = process
                .take_diagnostics()
                .map(spawn_diagnostics_reader)
                .transpose()?;
            Ok((rx, progress_reader, diagnostics_reader))
        });

    let (events, progress_reader, diagnostics_reader) = match readers {
        Ok(readers) => readers,
        Err(e) => {
            let _ = process.kill();
            let _ = process.wait();
            job.transition(JobState::Failed)?;
            return Err(e);
        }
    };

    Ok(EncodeRun {
        job,
        process,
        events,
        progress_reader: Some(progress_reader),
        diagnostics_reader,
        cancel,
        started: Instant::now(),
        last: None,
        stream_closed: false,
        killed: false,
        finished: false,
    })
}

/// Runs `job` to completion, calling `on_progress` for every progress event.
pub fn run<S, F>(
    spawner: &S,
    job: EncodeJob,
    maps: &MapPaths,
    audio: AudioMode,
    cancel: CancellationToken,
    mut on_progress: F,
) -> CoreResult<EncodeOutcome>
where
    S: FfmpegSpawner,
    F: FnMut(&EncodeProgress),
{
    let mut encode = start(spawner, job, maps, audio, cancel)?;
    for progress in encode.by_ref() {
        on_progress(&progress);
    }
    encode.finish()
}

fn spawn_progress_reader(
    pipe: PipeReader,
    tx: Sender<EncodeProgress>,
    duration_secs: f64,
) -> CoreResult<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("ffmpeg-progress".to_string())
        .spawn(move || {
            for line in BufReader::new(pipe).lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::debug!("Progress stream read failed: {}", e);
                        break;
                    }
                };
                if let Some(out_time) = parse_out_time_ms(&line) {
                    if tx.send(EncodeProgress::new(out_time, duration_secs)).is_err() {
                        break;
                    }
                }
            }
        })?;
    Ok(handle)
}

fn spawn_diagnostics_reader(mut pipe: PipeReader) -> CoreResult<JoinHandle<String>> {
    let handle = thread::Builder::new()
        .name("ffmpeg-stderr".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("Diagnostic stream read failed: {}", e);
            }
            String::from_utf8_lossy(&buf).trim().to_string()
        })?;
    Ok(handle)
}

impl<P: FfmpegProcess> EncodeRun<P> {
    pub fn state(&self) -> JobState {
        self.job.state()
    }

    /// Most recent progress event.
    pub fn last_progress(&self) -> Option<EncodeProgress> {
        self.last
    }

    /// Kills ffmpeg once; later calls are no-ops.
    fn abort(&mut self) {
        if !self.killed {
            log::warn!("Cancellation requested, stopping ffmpeg");
            if let Err(e) = self.process.kill() {
                log::warn!("Failed to kill ffmpeg: {}", e);
            }
            self.killed = true;
        }
        self.stream_closed = true;
    }

    fn join_readers(&mut self) -> String {
        if let Some(handle) = self.progress_reader.take() {
            let _ = handle.join();
        }
        self.diagnostics_reader
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    /// Waits for ffmpeg to exit and settles the job.
    ///
    /// Any progress not yet consumed is drained first. Returns
    /// [`CoreError::Cancelled`] if the run was cancelled and
    /// [`CoreError::EncodeFailed`] with ffmpeg's diagnostics if it exited
    /// unsuccessfully.
    pub fn finish(mut self) -> CoreResult<EncodeOutcome> {
        while self.next().is_some() {}
        self.finished = true;

        if self.killed {
            if let Err(e) = self.process.wait() {
                log::debug!("Reaping cancelled ffmpeg failed: {}", e);
            }
            self.join_readers();
            self.job.transition(JobState::Cancelled)?;
            return Err(CoreError::Cancelled);
        }

        let status = match self.process.wait() {
            Ok(status) => status,
            Err(e) => {
                self.join_readers();
                self.job.transition(JobState::Failed)?;
                return Err(e);
            }
        };
        let diagnostics = self.join_readers();

        // ffmpeg shares the terminal's process group and may exit on the
        // same Ctrl+C before the token was observed
        if !status.success() && self.cancel.is_cancelled() {
            self.job.transition(JobState::Cancelled)?;
            return Err(CoreError::Cancelled);
        }

        if !status.success() {
            log::error!("ffmpeg exited with {}", status);
            self.job.transition(JobState::Failed)?;
            return Err(command_failed_error("ffmpeg", status, diagnostics));
        }

        if !diagnostics.is_empty() {
            log::warn!("ffmpeg reported: {}", diagnostics);
        }
        self.job.transition(JobState::Completed)?;

        let elapsed = self.started.elapsed();
        log::info!(
            "Encode finished in {} ({})",
            crate::utils::format_duration(elapsed.as_secs_f64()),
            self.job.output_path.display()
        );

        Ok(EncodeOutcome {
            output_path: self.job.output_path.clone(),
            encoder: self.job.encoder_name.clone(),
            elapsed,
            final_progress: self.last,
        })
    }
}

impl<P: FfmpegProcess> Iterator for EncodeRun<P> {
    type Item = EncodeProgress;

    fn next(&mut self) -> Option<EncodeProgress> {
        if self.stream_closed {
            return None;
        }
        loop {
            if self.cancel.is_cancelled() {
                self.abort();
                return None;
            }
            match self.events.recv_timeout(POLL_INTERVAL) {
                Ok(progress) => {
                    self.last = Some(progress);
                    return Some(progress);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.stream_closed = true;
                    return None;
                }
            }
        }
    }
}

impl<P: FfmpegProcess> Drop for EncodeRun<P> {
    fn drop(&mut self) {
        // an abandoned run must not leave ffmpeg running
        if !self.finished {
            let _ = self.process.kill();
            let _ = self.process.wait();
        }
    }
}
