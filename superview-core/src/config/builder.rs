// ============================================================================
// superview-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig with defaults for every optional field.
// Validation happens once in build(); the resulting config is never mutated.

use std::path::PathBuf;

use super::{AudioMode, CoreConfig, DEFAULT_OUTPUT_FILE, EncoderStrategy};
use crate::error::{CoreError, CoreResult};

/// Builder for creating [`CoreConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    keep_maps: bool,
    encoder: Option<String>,
    encoder_strategy: EncoderStrategy,
    bitrate_bps: Option<u64>,
    audio_mode: AudioMode,
    squeeze: bool,
    fallback_duration_secs: Option<f64>,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input video path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Sets the output video path (defaults to `output.mp4`).
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the base directory for intermediate map files.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn keep_maps(mut self, keep: bool) -> Self {
        self.keep_maps = keep;
        self
    }

    /// Sets the requested encoder. Empty strings are treated as "not set".
    pub fn encoder(mut self, encoder: impl Into<String>) -> Self {
        let encoder = encoder.into();
        self.encoder = if encoder.trim().is_empty() {
            None
        } else {
            Some(encoder.trim().to_string())
        };
        self
    }

    pub fn encoder_strategy(mut self, strategy: EncoderStrategy) -> Self {
        self.encoder_strategy = strategy;
        self
    }

    /// Sets the target bitrate in bits per second.
    pub fn bitrate_bps(mut self, bitrate: u64) -> Self {
        self.bitrate_bps = Some(bitrate);
        self
    }

    pub fn audio_mode(mut self, mode: AudioMode) -> Self {
        self.audio_mode = mode;
        self
    }

    pub fn squeeze(mut self, squeeze: bool) -> Self {
        self.squeeze = squeeze;
        self
    }

    /// Sets the duration used for progress when the input does not report one.
    pub fn fallback_duration_secs(mut self, secs: f64) -> Self {
        self.fallback_duration_secs = Some(secs);
        self
    }

    /// Validates the collected settings and builds the immutable config.
    pub fn build(self) -> CoreResult<CoreConfig> {
        let input_path = self
            .input_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| CoreError::Config("input path is required".to_string()))?;

        let output_path = self
            .output_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
        if output_path.as_os_str().is_empty() {
            return Err(CoreError::Config("output path must not be empty".to_string()));
        }
        if output_path == input_path {
            return Err(CoreError::Config(format!(
                "output path '{}' would overwrite the input",
                output_path.display()
            )));
        }

        if self.bitrate_bps == Some(0) {
            return Err(CoreError::Config(
                "bitrate must be greater than zero".to_string(),
            ));
        }

        if let Some(secs) = self.fallback_duration_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(CoreError::Config(format!(
                    "fallback duration must be a positive number of seconds, got {secs}"
                )));
            }
        }

        Ok(CoreConfig {
            input_path,
            output_path,
            work_dir: self.work_dir,
            keep_maps: self.keep_maps,
            encoder: self.encoder,
            encoder_strategy: self.encoder_strategy,
            bitrate_bps: self.bitrate_bps,
            audio_mode: self.audio_mode,
            squeeze: self.squeeze,
            fallback_duration_secs: self.fallback_duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_original_tool() {
        let config = CoreConfigBuilder::new().input_path("in.mp4").build().unwrap();
        assert_eq!(config.output_path, PathBuf::from("output.mp4"));
        assert_eq!(config.encoder, None);
        assert_eq!(config.requested_encoder(), "");
        assert_eq!(config.encoder_strategy, EncoderStrategy::Exact);
        assert_eq!(config.audio_mode, AudioMode::Aac);
        assert!(!config.squeeze);
        assert!(!config.keep_maps);
    }

    #[test]
    fn missing_input_is_rejected() {
        let err = CoreConfigBuilder::new().build().unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn output_equal_to_input_is_rejected() {
        let err = CoreConfigBuilder::new()
            .input_path("clip.mp4")
            .output_path("clip.mp4")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("overwrite the input"));
    }

    #[test]
    fn zero_bitrate_and_bad_duration_are_rejected() {
        assert!(
            CoreConfigBuilder::new()
                .input_path("a.mp4")
                .bitrate_bps(0)
                .build()
                .is_err()
        );
        assert!(
            CoreConfigBuilder::new()
                .input_path("a.mp4")
                .fallback_duration_secs(f64::NAN)
                .build()
                .is_err()
        );
        assert!(
            CoreConfigBuilder::new()
                .input_path("a.mp4")
                .fallback_duration_secs(-1.0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn blank_encoder_counts_as_unset() {
        let config = CoreConfigBuilder::new()
            .input_path("a.mp4")
            .encoder("  ")
            .build()
            .unwrap();
        assert_eq!(config.encoder, None);

        let config = CoreConfigBuilder::new()
            .input_path("a.mp4")
            .encoder("libx265")
            .build()
            .unwrap();
        assert_eq!(config.requested_encoder(), "libx265");
    }
}
