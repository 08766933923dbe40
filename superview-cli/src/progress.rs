// ============================================================================
// superview-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal bar or JSON lines
//
// Two renderers for the core's progress events:
// - an indicatif bar on stderr (hidden when stderr is not a terminal)
// - JSON lines on stdout for scripts and wrappers (--json-progress)

use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::json;
use superview_core::{EncodeOutcome, EncodeProgress, format_duration};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}% {msg}";

/// Whether the terminal bar will actually be drawn.
pub fn bar_is_drawn() -> bool {
    console::user_attended_stderr()
}

/// Renders progress events for the user.
pub enum ProgressReporter {
    Bar(ProgressBar),
    Json(JsonProgressWriter),
}

impl ProgressReporter {
    /// Terminal bar, drawn on stderr only when a user is watching.
    pub fn bar() -> Self {
        let target = if bar_is_drawn() {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(100), target);
        match ProgressStyle::with_template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => log::debug!("Invalid progress template: {}", e),
        }
        Self::Bar(bar)
    }

    pub fn json() -> Self {
        Self::Json(JsonProgressWriter::new(Box::new(io::stdout())))
    }

    pub fn update(&mut self, progress: &EncodeProgress) {
        match self {
            Self::Bar(bar) => {
                let time = format_duration(progress.out_time_us as f64 / 1_000_000.0);
                match progress.percent {
                    Some(percent) => bar.set_position(percent.floor() as u64),
                    None => bar.tick(),
                }
                bar.set_message(time);
            }
            Self::Json(writer) => writer.progress(progress),
        }
    }

    pub fn finish(&mut self, outcome: &EncodeOutcome) {
        match self {
            Self::Bar(bar) => {
                bar.set_position(100);
                bar.finish_with_message("done");
            }
            Self::Json(writer) => writer.completed(outcome),
        }
    }

    /// Removes the bar after a failed or cancelled run.
    pub fn abandon(&mut self) {
        if let Self::Bar(bar) = self {
            bar.abandon();
        }
    }
}

/// Writes progress events as one JSON object per line.
pub struct JsonProgressWriter {
    output: Box<dyn Write + Send>,
}

impl JsonProgressWriter {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self { output }
    }

    fn write_json(&mut self, value: serde_json::Value) {
        if let Ok(line) = serde_json::to_string(&value) {
            let _ = writeln!(self.output, "{}", line);
            let _ = self.output.flush();
        }
    }

    pub fn progress(&mut self, progress: &EncodeProgress) {
        self.write_json(json!({
            "type": "progress",
            "out_time_us": progress.out_time_us,
            "percent": progress.percent,
        }));
    }

    pub fn completed(&mut self, outcome: &EncodeOutcome) {
        self.write_json(json!({
            "type": "completed",
            "output": outcome.output_path.display().to_string(),
            "encoder": outcome.encoder,
            "elapsed_seconds": outcome.elapsed.as_secs_f64(),
        }));
    }
}
