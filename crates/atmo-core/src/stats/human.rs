//! Human-readable sizes and rates (decimal units).

use std::time::Duration;

const UNITS: [(f64, &str); 3] = [(1.0e9, "GB"), (1.0e6, "MB"), (1.0e3, "KB")];

/// Formats `bytes` as `"1.5 MB"`. When `elapsed` is given, formats the rate
/// instead (`"1.5 MB/s"`); a zero duration leaves the size undivided.
pub fn human_readable(bytes: u64, elapsed: Option<Duration>) -> String {
    let mut value = bytes as f64;
    let suffix = match elapsed {
        Some(dt) => {
            let secs = dt.as_secs_f64();
            if secs > 0.0 {
                value /= secs;
            }
            "/s"
        }
        None => "",
    };
    for (factor, unit) in UNITS {
        if value >= factor {
            return format!("{:.1} {}{}", value / factor, unit, suffix);
        }
    }
    format!("{:.1} B{}", value, suffix)
}
