// ============================================================================
// superview-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or File Backend for the `log` Facade
//
// Only one global logger can be installed, so exactly one backend is chosen:
// - default: env_logger on stderr, `info` unless RUST_LOG says otherwise
// - --log-file: log4rs FileAppender with a timestamped pattern
//
// --verbose raises the default level to `debug` for either backend. While
// the progress bar is drawn, the console drops the per-10% records, which
// would otherwise tear through the bar; the file backend keeps them.

use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use superview_core::encode::PROGRESS_LOG_TARGET;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

/// Pattern used for file logs.
pub const FILE_LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Console level for the progress records.
pub fn progress_level_for(verbose: bool, progress_bar: bool) -> LevelFilter {
    if progress_bar {
        LevelFilter::Warn
    } else {
        level_for(verbose)
    }
}

/// Installs the global logger. `progress_bar` tells whether a progress bar
/// shares stderr with the console logger.
pub fn init_logging(verbose: bool, log_file: Option<&Path>, progress_bar: bool) -> Result<()> {
    let level = level_for(verbose);
    match log_file {
        Some(path) => setup_file_logging(path, level),
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .filter_module(PROGRESS_LOG_TARGET, progress_level_for(verbose, progress_bar))
                .parse_default_env()
                .format_target(false)
                .try_init()
                .context("Failed to initialise console logging")?;
            Ok(())
        }
    }
}

pub fn setup_file_logging(log_file: &Path, level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(level))?;

    log4rs::init_config(config)?;
    Ok(())
}
