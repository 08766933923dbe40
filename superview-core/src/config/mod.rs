//! Configuration structures and constants for the superview-core library.
//!
//! A [`CoreConfig`] is built once (usually by the CLI) through
//! [`CoreConfigBuilder`] and then passed by reference to every stage of the
//! pipeline. Nothing in the library reads ambient global options.

mod builder;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Output file used when the caller does not name one.
pub const DEFAULT_OUTPUT_FILE: &str = "output.mp4";

/// How a requested encoder name is turned into a concrete encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderStrategy {
    /// Use the requested encoder only if ffmpeg lists it, else the fallback codec.
    #[default]
    Exact,
    /// Prefer an encoder of the input's codec family that matches one of the
    /// detected hardware accelerators.
    PreferHardware,
}

/// What happens to the audio streams of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioMode {
    /// Re-encode audio to AAC.
    #[default]
    Aac,
    /// Pass audio through untouched.
    Copy,
}

impl AudioMode {
    /// Value passed to ffmpeg's `-c:a`.
    pub fn ffmpeg_codec(self) -> &'static str {
        match self {
            AudioMode::Aac => "aac",
            AudioMode::Copy => "copy",
        }
    }
}

/// Main configuration structure for the superview-core library.
///
/// Instances are immutable once built; use [`CoreConfigBuilder`] to create
/// one.
///
/// # Examples
///
/// ```rust
/// use superview_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .input_path("flight.mp4")
///     .output_path("flight-superview.mp4")
///     .squeeze(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.bitrate_bps, None);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Paths ----
    /// The video to correct
    pub input_path: PathBuf,

    /// Where the re-encoded video is written
    pub output_path: PathBuf,

    /// Base directory for the intermediate map files (system temp dir when unset)
    pub work_dir: Option<PathBuf>,

    /// Copy the map files next to the output instead of discarding them
    pub keep_maps: bool,

    // ---- Encoder Settings ----
    /// Requested encoder name; `None` keeps the input codec
    pub encoder: Option<String>,

    /// Resolution policy for `encoder`
    pub encoder_strategy: EncoderStrategy,

    /// Target video bitrate in bits per second; `None` keeps the input bitrate
    pub bitrate_bps: Option<u64>,

    /// Audio handling
    pub audio_mode: AudioMode,

    // ---- Warp Settings ----
    /// Correct 4:3 footage that was recorded stretched into 16:9
    pub squeeze: bool,

    /// Duration used for progress when the probe cannot report one
    pub fallback_duration_secs: Option<f64>,
}

impl CoreConfig {
    /// Requested encoder as a plain string, empty when none was given.
    pub fn requested_encoder(&self) -> &str {
        self.encoder.as_deref().unwrap_or("")
    }
}
