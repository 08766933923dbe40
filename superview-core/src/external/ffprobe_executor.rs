//! FFprobe integration for reading the geometry and timing of an input video.
//!
//! Only the first video stream is inspected. Duration and bitrate come from
//! the stream and fall back to the container; either may end up as zero when
//! the source does not carry it, which callers treat as "unknown".

use std::path::{Path, PathBuf};

use ffprobe::{FfProbeError, ffprobe};

use crate::error::{CoreError, CoreResult};

/// Geometry and timing of the input video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSpec {
    pub path: PathBuf,
    /// Codec name as ffprobe reports it (`h264`, `hevc`, ...)
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Zero when unknown
    pub duration_secs: f64,
    /// Zero when unknown
    pub bitrate_bps: u64,
}

/// Trait for probing an input file.
pub trait FfprobeExecutor {
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSpec>;
}

/// [`FfprobeExecutor`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_video(&self, input_path: &Path) -> CoreResult<VideoSpec> {
        log::debug!(
            "Running ffprobe (via crate) for video stream on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| {
            log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
            map_ffprobe_error(err)
        })?;

        let stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                CoreError::ProbeFailed(format!(
                    "no video stream found in {}",
                    input_path.display()
                ))
            })?;

        let fields = ProbeFields {
            codec_name: stream.codec_name.clone(),
            width: stream.width,
            height: stream.height,
            duration: stream
                .duration
                .clone()
                .or_else(|| metadata.format.duration.clone()),
            bit_rate: stream
                .bit_rate
                .clone()
                .or_else(|| metadata.format.bit_rate.clone()),
        };

        let spec = build_video_spec(input_path, fields)?;
        log::debug!(
            "Probed {}: codec={} {}x{} duration={:.2}s bitrate={}",
            input_path.display(),
            spec.codec,
            spec.width,
            spec.height,
            spec.duration_secs,
            spec.bitrate_bps
        );
        Ok(spec)
    }
}

/// Raw stream fields as ffprobe reports them.
#[derive(Debug, Clone, Default)]
pub struct ProbeFields {
    pub codec_name: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

/// Turns raw probe fields into a [`VideoSpec`].
///
/// Missing or non-positive dimensions fail the probe. Unparsable duration or
/// bitrate degrade to zero.
pub fn build_video_spec(path: &Path, fields: ProbeFields) -> CoreResult<VideoSpec> {
    let dimension = |value: Option<i64>, name: &str| -> CoreResult<u32> {
        match value {
            Some(v) if v > 0 && v <= i64::from(u32::MAX) => Ok(v as u32),
            Some(v) => Err(CoreError::ProbeFailed(format!(
                "invalid {name} {v} in {}",
                path.display()
            ))),
            None => Err(CoreError::ProbeFailed(format!(
                "video stream missing {name} in {}",
                path.display()
            ))),
        }
    };
    let width = dimension(fields.width, "width")?;
    let height = dimension(fields.height, "height")?;

    let duration_secs = match fields.duration.as_deref().map(str::trim) {
        Some(d) => match d.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs > 0.0 => secs,
            _ => {
                log::warn!("Unparsable duration '{}' for {}, treating as unknown", d, path.display());
                0.0
            }
        },
        None => 0.0,
    };

    let bitrate_bps = fields
        .bit_rate
        .as_deref()
        .and_then(|b| b.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Ok(VideoSpec {
        path: path.to_path_buf(),
        codec: fields.codec_name.unwrap_or_default(),
        width,
        height,
        duration_secs,
        bitrate_bps,
    })
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
            CoreError::ProbeFailed("ffprobe was not found on your system".to_string())
        }
        FfProbeError::Io(io_err) => CoreError::ProbeFailed(format!("failed to run ffprobe: {io_err}")),
        FfProbeError::Status(output) => CoreError::ProbeFailed(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        FfProbeError::Deserialize(err) => {
            CoreError::ProbeFailed(format!("unparsable ffprobe output: {err}"))
        }
        _ => CoreError::ProbeFailed(format!("unknown ffprobe error: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(duration: Option<&str>, bit_rate: Option<&str>) -> ProbeFields {
        ProbeFields {
            codec_name: Some("h264".to_string()),
            width: Some(1440),
            height: Some(1080),
            duration: duration.map(str::to_string),
            bit_rate: bit_rate.map(str::to_string),
        }
    }

    #[test]
    fn complete_fields_build_a_spec() {
        let spec =
            build_video_spec(Path::new("in.mp4"), fields(Some("12.500000"), Some("40000000")))
                .unwrap();
        assert_eq!(spec.codec, "h264");
        assert_eq!((spec.width, spec.height), (1440, 1080));
        assert_eq!(spec.duration_secs, 12.5);
        assert_eq!(spec.bitrate_bps, 40_000_000);
    }

    #[test]
    fn unparsable_duration_and_bitrate_degrade_to_zero() {
        let spec = build_video_spec(Path::new("in.mp4"), fields(Some("N/A"), Some("N/A"))).unwrap();
        assert_eq!(spec.duration_secs, 0.0);
        assert_eq!(spec.bitrate_bps, 0);

        let spec = build_video_spec(Path::new("in.mp4"), fields(None, None)).unwrap();
        assert_eq!(spec.duration_secs, 0.0);
        assert_eq!(spec.bitrate_bps, 0);
    }

    #[test]
    fn bad_dimensions_fail_the_probe() {
        let mut f = fields(None, None);
        f.width = Some(0);
        assert!(matches!(
            build_video_spec(Path::new("in.mp4"), f),
            Err(CoreError::ProbeFailed(_))
        ));

        let mut f = fields(None, None);
        f.height = None;
        assert!(matches!(
            build_video_spec(Path::new("in.mp4"), f),
            Err(CoreError::ProbeFailed(_))
        ));
    }
}
