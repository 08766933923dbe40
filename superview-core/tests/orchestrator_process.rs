//! Drives the orchestrator against real child processes. A small shell
//! script stands in for ffmpeg and writes a `-progress` stream to stdout.
#![cfg(unix)]

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use superview_core::encode::{self, EncodeJob, JobState};
use superview_core::external::{FfmpegProcess, FfmpegSpawner, PipeReader, VideoSpec};
use superview_core::remap::MapPaths;
use superview_core::{AudioMode, CancellationToken, CoreError, CoreResult};

struct ShellProcess(Child);

impl FfmpegProcess for ShellProcess {
    fn take_progress(&mut self) -> Option<PipeReader> {
        self.0.stdout.take().map(|s| Box::new(s) as PipeReader)
    }

    fn take_diagnostics(&mut self) -> Option<PipeReader> {
        self.0.stderr.take().map(|s| Box::new(s) as PipeReader)
    }

    fn kill(&mut self) -> CoreResult<()> {
        Ok(self.0.kill()?)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.0.wait()?)
    }
}

/// Runs `script` with `sh -c`, ignoring the ffmpeg arguments.
struct ShellSpawner {
    script: String,
}

impl ShellSpawner {
    fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
        }
    }
}

impl FfmpegSpawner for ShellSpawner {
    type Process = ShellProcess;

    fn spawn(&self, _args: &[String]) -> CoreResult<Self::Process> {
        Command::new("sh")
            .arg("-c")
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map(ShellProcess)
            .map_err(|e| CoreError::EncodeSpawnFailed(e.to_string()))
    }
}

fn job(duration_secs: f64) -> EncodeJob {
    let spec = VideoSpec {
        path: PathBuf::from("in.mp4"),
        codec: "h264".to_string(),
        width: 1440,
        height: 1080,
        duration_secs,
        bitrate_bps: 0,
    };
    EncodeJob::new(spec, "libx264", 0, "out.mp4")
}

fn maps() -> MapPaths {
    MapPaths {
        x_path: PathBuf::from("x.pgm"),
        y_path: PathBuf::from("y.pgm"),
    }
}

#[test]
fn progress_from_a_real_pipe() {
    let spawner = ShellSpawner::new(
        "printf 'frame=1\\nout_time_ms=N/A\\nprogress=continue\\n'; \
         printf 'out_time_ms=1000000\\nprogress=continue\\n'; \
         printf 'out_time_ms=4000000\\nprogress=end\\n'",
    );
    let mut percents = Vec::new();
    let outcome = encode::run(
        &spawner,
        job(4.0),
        &maps(),
        AudioMode::Aac,
        CancellationToken::new(),
        |p| percents.push(p.percent.unwrap()),
    )
    .unwrap();

    assert_eq!(percents, vec![25.0, 100.0]);
    assert_eq!(outcome.final_progress.unwrap().out_time_us, 4_000_000);
}

#[test]
fn failing_process_reports_its_stderr() {
    let spawner = ShellSpawner::new("echo 'Error while opening encoder' >&2; exit 3");
    let err = encode::run(
        &spawner,
        job(4.0),
        &maps(),
        AudioMode::Aac,
        CancellationToken::new(),
        |_| {},
    )
    .unwrap_err();

    match err {
        CoreError::EncodeFailed { status, output, .. } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(output, "Error while opening encoder");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn cancellation_kills_a_stalled_process_promptly() {
    let spawner = ShellSpawner::new("printf 'out_time_ms=500000\\n'; exec sleep 30");
    let cancel = CancellationToken::new();
    let mut run = encode::start(&spawner, job(10.0), &maps(), AudioMode::Aac, cancel.clone()).unwrap();
    assert_eq!(run.state(), JobState::Running);
    assert_eq!(run.next().unwrap().percent, Some(5.0));

    let started = Instant::now();
    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        remote.cancel();
    });

    assert!(run.next().is_none());
    let err = run.finish().unwrap_err();
    canceller.join().unwrap();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));
}
