//! Implementation of the encode command.
//!
//! Turns the parsed arguments into a `CoreConfig`, discovers ffmpeg, prints
//! the banner and hands the work to `superview_core::process_video`.

use anyhow::{Context, Result};
use console::style;
use log::info;

use superview_core::config::{AudioMode, CoreConfig, CoreConfigBuilder, EncoderStrategy};
use superview_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use superview_core::{CancellationToken, CoreError, EncodeOutcome, discover, format_duration, process_video};

use crate::cli::Cli;
use crate::progress::ProgressReporter;
use crate::signals::spawn_interrupt_watcher;

/// Creates the core configuration from the CLI arguments.
pub fn create_core_config(args: &Cli) -> Result<CoreConfig, CoreError> {
    let mut builder = CoreConfigBuilder::new()
        .input_path(&args.input)
        .output_path(&args.output)
        .squeeze(args.squeeze)
        .keep_maps(args.keep_maps)
        .encoder_strategy(if args.prefer_hw {
            EncoderStrategy::PreferHardware
        } else {
            EncoderStrategy::Exact
        })
        .audio_mode(if args.copy_audio {
            AudioMode::Copy
        } else {
            AudioMode::Aac
        });

    if let Some(encoder) = &args.encoder {
        builder = builder.encoder(encoder.as_str());
    }
    if let Some(bitrate) = args.bitrate {
        builder = builder.bitrate_bps(bitrate);
    }
    if let Some(secs) = args.duration {
        builder = builder.fallback_duration_secs(secs);
    }
    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir);
    }
    builder.build()
}

/// Runs one encode from start to finish.
pub fn run_encode(args: Cli) -> Result<EncodeOutcome> {
    let config = create_core_config(&args)?;

    if !config.input_path.is_file() {
        return Err(CoreError::ProbeFailed(format!(
            "input file '{}' does not exist",
            config.input_path.display()
        ))
        .into());
    }

    let capabilities = discover()?;
    if !args.json_progress {
        println!("{}", style("Superview").bold());
        println!("{}", capabilities.banner());
    }
    info!("Processing {}", config.input_path.display());

    let cancel = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone())?;

    let mut reporter = if args.json_progress {
        ProgressReporter::json()
    } else {
        ProgressReporter::bar()
    };

    let result = process_video(
        &config,
        &capabilities,
        &CrateFfprobeExecutor::new(),
        &SidecarSpawner,
        &cancel,
        |progress| reporter.update(progress),
    );

    match result {
        Ok(outcome) => {
            reporter.finish(&outcome);
            if !args.json_progress {
                println!(
                    "{} {} in {}",
                    style("Wrote").green().bold(),
                    outcome.output_path.display(),
                    format_duration(outcome.elapsed.as_secs_f64())
                );
            }
            Ok(outcome)
        }
        Err(e) => {
            reporter.abandon();
            Err(e).with_context(|| format!("Failed to process {}", config.input_path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("superview").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_flow_into_the_config() {
        let config = create_core_config(&parse(&[
            "-i", "in.mp4", "-e", "libx265", "-b", "1000", "-s", "--prefer-hw", "--copy-audio",
            "--duration", "12.5", "--work-dir", "/tmp/maps", "--keep-maps",
        ]))
        .unwrap();
        assert_eq!(config.requested_encoder(), "libx265");
        assert_eq!(config.bitrate_bps, Some(1000));
        assert!(config.squeeze);
        assert!(config.keep_maps);
        assert_eq!(config.encoder_strategy, EncoderStrategy::PreferHardware);
        assert_eq!(config.audio_mode, AudioMode::Copy);
        assert_eq!(config.fallback_duration_secs, Some(12.5));
        assert_eq!(config.work_dir.as_deref(), Some(std::path::Path::new("/tmp/maps")));
    }

    #[test]
    fn empty_encoder_keeps_the_input_codec() {
        let config = create_core_config(&parse(&["-i", "in.mp4", "-e", ""])).unwrap();
        assert_eq!(config.encoder, None);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = create_core_config(&parse(&["-i", "in.mp4", "-b", "0"])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
