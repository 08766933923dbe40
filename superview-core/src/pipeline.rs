// ============================================================================
// superview-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: One input video from probe to finished encode
//
// 1. check the input exists
// 2. probe codec, geometry and timing
// 3. resolve the encoder and the effective bitrate
// 4. generate the remap grid and write the map files
// 5. run the encode, forwarding progress
// 6. keep or discard the map files
//
// Every failure aborts the run. The map workspace is removed on every exit
// path when it goes out of scope.

use crate::cancel::CancellationToken;
use crate::config::CoreConfig;
use crate::encode::{self, EncodeJob, EncodeOutcome, EncodeProgress, ProgressLogger};
use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderCapabilities, FfmpegSpawner, FfprobeExecutor, resolve_with_strategy};
use crate::remap::{self, pgm};
use crate::temp_files::{self, MapWorkspace};
use crate::utils::{format_bitrate, format_duration};

/// Corrects one video as described by `config`.
///
/// `on_progress` receives every progress event of the encode. Cancelling
/// `cancel` stops ffmpeg and makes this return [`CoreError::Cancelled`].
pub fn process_video<P, S, F>(
    config: &CoreConfig,
    capabilities: &EncoderCapabilities,
    probe: &P,
    spawner: &S,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> CoreResult<EncodeOutcome>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    F: FnMut(&EncodeProgress),
{
    let input = &config.input_path;
    if !input.is_file() {
        return Err(CoreError::ProbeFailed(format!(
            "input file '{}' does not exist or is not a file",
            input.display()
        )));
    }

    let spec = probe.probe_video(input)?;
    log::info!(
        "Input: {} {}x{}, {}, {}",
        spec.codec,
        spec.width,
        spec.height,
        format_duration(spec.duration_secs),
        format_bitrate(spec.bitrate_bps)
    );

    let encoder = resolve_with_strategy(
        config.requested_encoder(),
        capabilities,
        &spec.codec,
        config.encoder_strategy,
    );
    log::info!("Encoder: {}", encoder);

    let bitrate_bps = config.bitrate_bps.unwrap_or(spec.bitrate_bps);
    if bitrate_bps == 0 {
        log::warn!("Input bitrate is unknown and none was given, letting the encoder choose");
    } else {
        log::info!("Bitrate: {}", format_bitrate(bitrate_bps));
    }

    let grid = remap::generate(spec.width, spec.height, config.squeeze);
    log::info!(
        "Output: {}x{} ({} mode)",
        grid.width(),
        grid.height(),
        if config.squeeze { "squeeze" } else { "stretch" }
    );

    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }

    let workspace = MapWorkspace::create(config)?;
    let maps = workspace.map_paths();
    pgm::write(&grid, &maps.x_path, &maps.y_path)?;
    drop(grid);

    let job = EncodeJob::new(spec, encoder, bitrate_bps, &config.output_path)
        .with_fallback_duration(config.fallback_duration_secs);
    if job.duration_secs <= 0.0 {
        log::warn!("Input duration is unknown, progress will be reported without a percentage");
    }

    let mut logger = ProgressLogger::new();
    let result = encode::run(
        spawner,
        job,
        &maps,
        config.audio_mode,
        cancel.clone(),
        |progress| {
            if let Some(percent) = progress.percent {
                logger.observe(percent);
            }
            on_progress(progress);
        },
    );

    if config.keep_maps {
        if let Err(e) = temp_files::keep_maps(&maps, &config.output_path) {
            log::warn!("Could not keep map files: {}", e);
            if result.is_ok() {
                return Err(e);
            }
        }
    }

    drop(workspace);
    result
}
