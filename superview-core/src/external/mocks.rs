// superview-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

use crossbeam_channel::{Receiver, Sender, bounded};

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, PipeReader};
use super::ffprobe_executor::{FfprobeExecutor, VideoSpec};
use crate::error::{CoreError, CoreResult};

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    // wait(2) encoding: exit code in the second byte
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Reader that replays a script, then optionally blocks until the process
/// is killed, like a pipe whose writer is still alive.
struct ScriptedPipe {
    data: Cursor<Vec<u8>>,
    hold: Option<Receiver<()>>,
}

impl Read for ScriptedPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        if let Some(hold) = self.hold.take() {
            // returns once the sender is dropped by kill()
            let _ = hold.recv();
        }
        Ok(0)
    }
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    progress: Option<Vec<u8>>,
    diagnostics: Option<Vec<u8>>,
    exit_status: ExitStatus,
    hold: Option<(Sender<()>, Receiver<()>)>,
    killed: Rc<RefCell<bool>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn take_progress(&mut self) -> Option<PipeReader> {
        let data = self.progress.take()?;
        let hold = self.hold.as_ref().map(|(_, rx)| rx.clone());
        Some(Box::new(ScriptedPipe {
            data: Cursor::new(data),
            hold,
        }))
    }

    fn take_diagnostics(&mut self) -> Option<PipeReader> {
        let data = self.diagnostics.take()?;
        Some(Box::new(Cursor::new(data)))
    }

    fn kill(&mut self) -> CoreResult<()> {
        *self.killed.borrow_mut() = true;
        self.hold = None;
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        if *self.killed.borrow() {
            return Ok(exit_status(255));
        }
        Ok(self.exit_status)
    }
}

/// Scripted behaviour of one spawned process.
#[derive(Debug, Clone, Default)]
pub struct MockFfmpegScript {
    /// Lines written to the progress stream
    pub progress_lines: Vec<String>,
    /// Text written to the diagnostic stream
    pub diagnostics: String,
    pub exit_code: i32,
    /// Keep the progress stream open after the script until killed
    pub hang: bool,
    /// Create an empty file at the last argument (the output path)
    pub create_output: bool,
}

/// Mock implementation of FfmpegSpawner replaying scripted processes in order.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    scripts: Rc<RefCell<Vec<CoreResult<MockFfmpegScript>>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    killed: Rc<RefCell<bool>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_script(&self, script: MockFfmpegScript) {
        self.scripts.borrow_mut().push(Ok(script));
    }

    /// Queues a process that reports the given `out_time_ms` values and exits 0.
    pub fn add_success(&self, out_times: &[u64]) {
        self.add_script(MockFfmpegScript {
            progress_lines: progress_lines(out_times),
            create_output: true,
            ..Default::default()
        });
    }

    pub fn add_exit_error(&self, out_times: &[u64], exit_code: i32, diagnostics: &str) {
        self.add_script(MockFfmpegScript {
            progress_lines: progress_lines(out_times),
            diagnostics: diagnostics.to_string(),
            exit_code,
            ..Default::default()
        });
    }

    /// Queues a process that never finishes on its own.
    pub fn add_hanging(&self, out_times: &[u64]) {
        self.add_script(MockFfmpegScript {
            progress_lines: progress_lines(out_times),
            hang: true,
            ..Default::default()
        });
    }

    pub fn add_spawn_error(&self, message: &str) {
        self.scripts
            .borrow_mut()
            .push(Err(CoreError::EncodeSpawnFailed(message.to_string())));
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Whether any spawned process was killed.
    pub fn was_killed(&self) -> bool {
        *self.killed.borrow()
    }
}

/// Progress blocks as ffmpeg's `-progress` writes them.
pub fn progress_lines(out_times: &[u64]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, t) in out_times.iter().enumerate() {
        lines.push(format!("frame={}", (i + 1) * 30));
        lines.push(format!("out_time_us={t}"));
        lines.push(format!("out_time_ms={t}"));
        lines.push("speed=1.01x".to_string());
        lines.push("progress=continue".to_string());
    }
    lines.push("progress=end".to_string());
    lines
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, args: &[String]) -> CoreResult<Self::Process> {
        self.received_calls.borrow_mut().push(args.to_vec());

        let mut scripts = self.scripts.borrow_mut();
        if scripts.is_empty() {
            panic!("MockFfmpegSpawner: no script queued for command args: {:?}", args);
        }
        let script = scripts.remove(0)?;

        if script.create_output {
            if let Some(output) = args.last() {
                if let Err(e) = std::fs::File::create(output) {
                    log::error!("MockFfmpegSpawner failed to create {}: {}", output, e);
                }
            }
        }

        let mut progress = script.progress_lines.join("\n").into_bytes();
        if !progress.is_empty() {
            progress.push(b'\n');
        }

        Ok(MockFfmpegProcess {
            progress: Some(progress),
            diagnostics: Some(script.diagnostics.into_bytes()),
            exit_status: exit_status(script.exit_code),
            hold: script.hang.then(|| bounded(0)),
            killed: Rc::clone(&self.killed),
        })
    }
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Rc<RefCell<HashMap<PathBuf, VideoSpec>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_video(&self, spec: VideoSpec) {
        self.results.borrow_mut().insert(spec.path.clone(), spec);
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSpec> {
        self.results
            .borrow()
            .get(input_path)
            .cloned()
            .ok_or_else(|| {
                CoreError::ProbeFailed(format!(
                    "MockFfprobeExecutor: no expectation for {}",
                    input_path.display()
                ))
            })
    }
}
