// superview-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::path::PathBuf;

use superview_core::config::DEFAULT_OUTPUT_FILE;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Superview: dynamic wide-angle video stretching",
    long_about = "Stretches 4:3 footage to 16:9 the way GoPro SuperView does, \
                  keeping the centre of the frame undistorted, or undoes a 4:3 \
                  to 16:9 stretch with --squeeze. Encoding is done by ffmpeg."
)]
pub struct Cli {
    /// The input video filename
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: PathBuf,

    /// The output video filename
    #[arg(short = 'o', long = "output", value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// The encoder to use (e.g. libx265, hevc_videotoolbox); defaults to the input codec
    #[arg(short = 'e', long = "encoder", value_name = "ENCODER")]
    pub encoder: Option<String>,

    /// The bitrate in bits per second; defaults to the input bitrate
    #[arg(short = 'b', long = "bitrate", value_name = "BPS")]
    pub bitrate: Option<u64>,

    /// Squeeze 4:3 footage that was recorded stretched to 16:9 back into shape
    #[arg(short = 's', long = "squeeze", default_value_t = false)]
    pub squeeze: bool,

    /// Prefer a hardware-accelerated encoder of the input's codec family
    #[arg(long)]
    pub prefer_hw: bool,

    /// Copy audio streams instead of re-encoding them to AAC
    #[arg(long)]
    pub copy_audio: bool,

    /// Duration in seconds used for progress when the input does not report one
    #[arg(long, value_name = "SECS")]
    pub duration: Option<f64>,

    /// Directory for the intermediate map files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR", env = "SUPERVIEW_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Keep the map files next to the output as <name>.x.pgm and <name>.y.pgm
    #[arg(long)]
    pub keep_maps: bool,

    /// Write logs to this file instead of the terminal
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Emit progress as JSON lines on stdout
    #[arg(long)]
    pub json_progress: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
