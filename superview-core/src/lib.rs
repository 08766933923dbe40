//! Core library for superview-style dynamic stretching of wide-angle video.
//!
//! The crate computes a per-pixel remap that widens (or un-squeezes) the
//! frame, writes it as a pair of PGM map files and drives ffmpeg's `remap`
//! filter to apply it, reporting progress as the encode runs.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use superview_core::config::CoreConfigBuilder;
//! use superview_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use superview_core::{CancellationToken, discover, process_video};
//!
//! let config = CoreConfigBuilder::new()
//!     .input_path("GX010042.MP4")
//!     .output_path("GX010042-superview.mp4")
//!     .build()
//!     .unwrap();
//! let capabilities = discover().unwrap();
//! println!("{}", capabilities.banner());
//!
//! let outcome = process_video(
//!     &config,
//!     &capabilities,
//!     &CrateFfprobeExecutor::new(),
//!     &SidecarSpawner,
//!     &CancellationToken::new(),
//!     |progress| {
//!         if let Some(percent) = progress.percent {
//!             println!("{percent:.1}%");
//!         }
//!     },
//! )
//! .unwrap();
//! println!("wrote {}", outcome.output_path.display());
//! ```

pub mod cancel;
pub mod config;
pub mod encode;
pub mod error;
pub mod external;
pub mod pipeline;
pub mod remap;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use config::{AudioMode, CoreConfig, CoreConfigBuilder, EncoderStrategy};
pub use encode::{EncodeJob, EncodeOutcome, EncodeProgress, EncodeRun, JobState};
pub use error::{CoreError, CoreResult};
pub use external::{EncoderCapabilities, VideoSpec, discover, resolve};
pub use pipeline::process_video;
pub use remap::{RemapGrid, generate};
pub use utils::{format_bitrate, format_duration};
