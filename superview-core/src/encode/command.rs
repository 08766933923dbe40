//! FFmpeg argument construction for the remap encode.
//!
//! The argument list is built as plain strings so it can be logged, asserted
//! on in tests and handed to any [`FfmpegSpawner`](crate::external::FfmpegSpawner).

use std::path::Path;

use crate::config::AudioMode;
use crate::encode::job::EncodeJob;
use crate::external::CodecFamily;
use crate::remap::MapPaths;

/// Builder for the `-filter_complex` chain
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter; empty names are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Chain used for every encode: remap, then normalise the pixel format.
    #[must_use]
    pub fn remap() -> Self {
        Self::new()
            .add_filter("remap")
            .add_filter("format=yuv444p")
            .add_filter("format=yuv420p")
    }

    #[must_use]
    pub fn build(self) -> String {
        self.filters.join(",")
    }
}

/// Builds the ffmpeg arguments (without the program name) for `job`.
///
/// Inputs are the source video followed by the horizontal and vertical maps,
/// which is the input order the `remap` filter expects. Progress goes to
/// stdout as `key=value` lines, diagnostics to stderr.
pub fn build_encode_args(job: &EncodeJob, maps: &MapPaths, audio: AudioMode) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(32);
    let mut push = |items: &[&str]| args.extend(items.iter().map(|s| s.to_string()));

    push(&["-hide_banner", "-nostdin", "-loglevel", "error"]);
    push(&["-progress", "pipe:1", "-y"]);
    push(&["-i", path_arg(&job.spec.path).as_str()]);
    push(&["-i", path_arg(&maps.x_path).as_str()]);
    push(&["-i", path_arg(&maps.y_path).as_str()]);

    let chain = VideoFilterChain::remap().build();
    push(&["-filter_complex", chain.as_str()]);

    push(&["-c:v", job.encoder_name.as_str()]);
    if job.bitrate_bps > 0 {
        push(&["-b:v", job.bitrate_bps.to_string().as_str()]);
    }
    push(&["-c:a", audio.ffmpeg_codec()]);

    // x265 prints its own banner and stats unless told otherwise
    if CodecFamily::of(&job.encoder_name) == Some(CodecFamily::Hevc) {
        push(&["-x265-params", "log-level=error"]);
    }

    push(&[path_arg(&job.output_path).as_str()]);
    args
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::VideoSpec;
    use std::path::PathBuf;

    fn job(encoder: &str, bitrate: u64) -> EncodeJob {
        let spec = VideoSpec {
            path: PathBuf::from("in.mp4"),
            codec: "h264".to_string(),
            width: 1440,
            height: 1080,
            duration_secs: 10.0,
            bitrate_bps: 8_000_000,
        };
        EncodeJob::new(spec, encoder, bitrate, "out.mp4")
    }

    fn maps() -> MapPaths {
        MapPaths {
            x_path: PathBuf::from("/tmp/w/x.pgm"),
            y_path: PathBuf::from("/tmp/w/y.pgm"),
        }
    }

    #[test]
    fn full_h264_invocation() {
        let args = build_encode_args(&job("libx264", 8_000_000), &maps(), AudioMode::Aac);
        assert_eq!(
            args.join(" "),
            "-hide_banner -nostdin -loglevel error -progress pipe:1 -y \
             -i in.mp4 -i /tmp/w/x.pgm -i /tmp/w/y.pgm \
             -filter_complex remap,format=yuv444p,format=yuv420p \
             -c:v libx264 -b:v 8000000 -c:a aac out.mp4"
        );
    }

    #[test]
    fn hevc_encoders_get_quiet_x265_params() {
        let args = build_encode_args(&job("libx265", 1), &maps(), AudioMode::Copy);
        let x265 = args.iter().position(|a| a == "-x265-params").unwrap();
        assert_eq!(args[x265 + 1], "log-level=error");
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn zero_bitrate_omits_the_flag() {
        let args = build_encode_args(&job("h264", 0), &maps(), AudioMode::Aac);
        assert!(!args.iter().any(|a| a == "-b:v"));
        assert!(!args.iter().any(|a| a == "-x265-params"));
    }

    #[test]
    fn remap_chain_normalises_the_pixel_format() {
        assert_eq!(
            VideoFilterChain::remap().add_filter("").build(),
            "remap,format=yuv444p,format=yuv420p"
        );
        let args = build_encode_args(&job("h264", 0), &maps(), AudioMode::Aac);
        assert!(args.windows(2).any(|w| w == ["-filter_complex", "remap,format=yuv444p,format=yuv420p"]));
    }
}
