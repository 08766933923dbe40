// ============================================================================
// superview-core/src/external/capabilities.rs
// ============================================================================
//
// CAPABILITY RESOLVER: ffmpeg Version, Accelerators and Encoders
//
// Queries the ffmpeg binary once per run for its version, its hardware
// accelerators (`-hwaccels`) and its H.264/H.265 video encoders (`-encoders`),
// and turns a requested encoder name into a concrete one.
//
// The listing parsers are pure functions over ffmpeg's text output so they can
// be tested without ffmpeg installed. Selection logic works on the typed sets
// they return, never on the raw text.

use std::collections::BTreeSet;
use std::fmt;
use std::process::Command;

use serde::Serialize;

use crate::config::EncoderStrategy;
use crate::error::{CoreError, CoreResult};

/// Lines printed by `ffmpeg -hwaccels` before the first accelerator name.
const HWACCELS_HEADER_LINES: usize = 1;

/// Lines printed by `ffmpeg -encoders` before the first encoder row.
const ENCODERS_HEADER_LINES: usize = 10;

/// Row prefix (capability flags column) marking a video encoder.
const VIDEO_ENCODER_MARKER: &str = " V";

/// Codec families the tool can re-encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CodecFamily {
    H264,
    Hevc,
}

impl CodecFamily {
    /// Classifies an encoder or codec name (`libx264`, `hevc_nvenc`, `h264`, ...).
    pub fn of(name: &str) -> Option<Self> {
        if name.contains("264") {
            Some(CodecFamily::H264)
        } else if name.contains("265") || name.contains("hevc") {
            Some(CodecFamily::Hevc)
        } else {
            None
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecFamily::H264 => write!(f, "H.264"),
            CodecFamily::Hevc => write!(f, "H.265"),
        }
    }
}

/// What the installed ffmpeg can do, queried once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncoderCapabilities {
    pub tool_version: String,
    pub hw_accelerators: BTreeSet<String>,
    /// Only encoders of a known [`CodecFamily`]
    pub video_encoders: BTreeSet<String>,
}

impl EncoderCapabilities {
    /// Startup banner listing the detected version, accelerators and encoders.
    pub fn banner(&self) -> String {
        let join = |set: &BTreeSet<String>| set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        format!(
            "- ffmpeg version: {}\n- Hardware accelerators: {}\n- H.264/H.265 encoders: {}",
            self.tool_version,
            join(&self.hw_accelerators),
            join(&self.video_encoders)
        )
    }

    /// Encoders of `family`, in name order.
    pub fn encoders_of(&self, family: CodecFamily) -> impl Iterator<Item = &str> {
        self.video_encoders
            .iter()
            .map(String::as_str)
            .filter(move |name| CodecFamily::of(name) == Some(family))
    }
}

/// Queries the `ffmpeg` found on `PATH`.
pub fn discover() -> CoreResult<EncoderCapabilities> {
    discover_with("ffmpeg")
}

/// Queries the given ffmpeg binary.
///
/// Fails with [`CoreError::ToolchainNotFound`] when `-version` cannot be run.
/// The accelerator and encoder listings are best effort: a failing listing
/// yields an empty set.
pub fn discover_with(program: &str) -> CoreResult<EncoderCapabilities> {
    let version_output = run_query(program, &["-version"])
        .map_err(|_| CoreError::ToolchainNotFound(program.to_string()))?;
    let tool_version = parse_version(&version_output)
        .ok_or_else(|| CoreError::ToolchainNotFound(program.to_string()))?;

    let hw_accelerators = match run_query(program, &["-hide_banner", "-hwaccels"]) {
        Ok(text) => parse_hwaccels(&text),
        Err(e) => {
            log::warn!("Could not list hardware accelerators: {}", e);
            BTreeSet::new()
        }
    };

    let video_encoders = match run_query(program, &["-hide_banner", "-encoders"]) {
        Ok(text) => parse_encoders(&text),
        Err(e) => {
            log::warn!("Could not list encoders: {}", e);
            BTreeSet::new()
        }
    };

    log::debug!(
        "Discovered ffmpeg {} with {} accelerator(s) and {} encoder(s)",
        tool_version,
        hw_accelerators.len(),
        video_encoders.len()
    );

    Ok(EncoderCapabilities {
        tool_version,
        hw_accelerators,
        video_encoders,
    })
}

fn run_query(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("failed to run {program}: {e}"))?;
    if !output.status.success() {
        return Err(format!("{program} {} exited with {}", args.join(" "), output.status));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Version token of `ffmpeg -version` (`ffmpeg version 6.1.1 Copyright ...`).
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()?
        .split_whitespace()
        .nth(2)
        .map(str::to_string)
}

/// Accelerator names of `ffmpeg -hwaccels`.
pub fn parse_hwaccels(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .skip(HWACCELS_HEADER_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// H.264/H.265 video encoder names of `ffmpeg -encoders`.
pub fn parse_encoders(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .skip(ENCODERS_HEADER_LINES)
        .filter(|line| line.starts_with(VIDEO_ENCODER_MARKER))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter(|name| CodecFamily::of(name).is_some())
        .map(str::to_string)
        .collect()
}

/// Resolves a requested encoder name with the exact-match policy.
///
/// An empty request returns `fallback` unchanged. A non-empty request is
/// returned only when ffmpeg lists it, otherwise `fallback` is used.
pub fn resolve(requested: &str, caps: &EncoderCapabilities, fallback: &str) -> String {
    if requested.is_empty() {
        return fallback.to_string();
    }
    if caps.video_encoders.contains(requested) {
        requested.to_string()
    } else {
        log::warn!(
            "Encoder '{}' is not available, keeping the input codec '{}'",
            requested,
            fallback
        );
        fallback.to_string()
    }
}

/// Resolves a requested encoder name under `strategy`.
pub fn resolve_with_strategy(
    requested: &str,
    caps: &EncoderCapabilities,
    fallback: &str,
    strategy: EncoderStrategy,
) -> String {
    let resolved = match strategy {
        EncoderStrategy::Exact => resolve(requested, caps, fallback),
        EncoderStrategy::PreferHardware => prefer_hardware(requested, caps, fallback),
    };
    log::debug!(
        "Resolved encoder request '{}' ({:?}) to '{}'",
        requested,
        strategy,
        resolved
    );
    resolved
}

fn prefer_hardware(requested: &str, caps: &EncoderCapabilities, fallback: &str) -> String {
    if !requested.is_empty() && caps.video_encoders.contains(requested) {
        return requested.to_string();
    }

    let family_source = if requested.is_empty() { fallback } else { requested };
    let Some(family) = CodecFamily::of(family_source) else {
        return fallback.to_string();
    };

    let hardware = caps.encoders_of(family).find(|encoder| {
        caps.hw_accelerators
            .iter()
            .any(|accel| encoder_markers(accel).iter().any(|m| encoder.contains(m)))
    });

    hardware
        .or_else(|| caps.encoders_of(family).next())
        .unwrap_or(fallback)
        .to_string()
}

// NVIDIA encoders are named after NVENC, not the cuda hwaccel
fn encoder_markers(accel: &str) -> Vec<&str> {
    match accel {
        "cuda" => vec!["nvenc", "cuda"],
        other => vec![other],
    }
}
