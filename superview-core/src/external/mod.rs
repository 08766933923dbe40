// ============================================================================
// superview-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Everything that shells out lives here, behind traits where the rest of the
// crate needs to substitute a fake in tests:
// - ffprobe_executor: reads the input's codec, geometry and timing
// - capabilities: ffmpeg version, accelerators and encoders, encoder selection
// - ffmpeg_executor: spawns and supervises the encode process

pub mod capabilities;
pub mod ffmpeg_executor;
pub mod ffprobe_executor;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use capabilities::{
    CodecFamily, EncoderCapabilities, discover, discover_with, resolve, resolve_with_strategy,
};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, PipeReader, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, VideoSpec};
