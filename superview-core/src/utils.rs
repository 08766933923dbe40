//! Formatting helpers for log lines and the CLI summary.

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a bitrate with decimal units (bps, kbps, Mbps). Zero is "unknown".
#[must_use]
pub fn format_bitrate(bps: u64) -> String {
    const KBPS: f64 = 1_000.0;
    const MBPS: f64 = 1_000_000.0;

    let value = bps as f64;
    if bps == 0 {
        "unknown".to_string()
    } else if value >= MBPS {
        format!("{:.2} Mbps", value / MBPS)
    } else if value >= KBPS {
        format!("{:.1} kbps", value / KBPS)
    } else {
        format!("{bps} bps")
    }
}
