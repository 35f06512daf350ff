// @module: Human readable byte counts

const POWER: f64 = 1024.0;

/// Magnitude labels. Sizes that would need GB stay in MB.
const POWER_LABELS: [&str; 3] = ["B", "KB", "MB"];

/// Format a byte count as B, KB or MB with two decimals.
///
/// The value is divided by 1024 while it is strictly greater than 1024, so
/// `1024` prints as `"1024.00 B"`. Counts of a GiB or more keep the MB label
/// (`2 GiB` prints as `"2048.00 MB"`).
pub fn format_bytes(size: u64) -> String {
    let mut value = size as f64;
    let mut n = 0;

    while value > POWER && n < POWER_LABELS.len() - 1 {
        value /= POWER;
        n += 1;
    }

    format!("{:.2} {}", value, POWER_LABELS[n])
}
