//! Display helpers for paths and sizes.
//!
//! Pure functions with no state. [`clean_path`] is cosmetic only: it does
//! not make a path safe, the service must enforce its own root.

/// Filename used when a path has no usable final segment.
pub const FALLBACK_FILE_NAME: &str = "download";

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Strip every leading `../` segment from a path for display.
///
/// ```
/// use file_dashboard::format::clean_path;
/// assert_eq!(clean_path("../../etc/passwd"), "etc/passwd");
/// assert_eq!(clean_path("docs/../a.txt"), "docs/../a.txt");
/// ```
pub fn clean_path(path: &str) -> &str {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    rest
}

/// Human-readable size with two decimals, e.g. `1536` → `"1.5 KB"`.
pub fn format_bytes(bytes: i64) -> String {
    format_bytes_with(bytes, 2)
}

/// Human-readable size with up to `decimals` decimal places.
///
/// Trailing zeros are dropped (`1.50` prints as `1.5`). Negative sizes
/// yield `"Invalid size"`.
pub fn format_bytes_with(bytes: i64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    if bytes < 0 {
        return "Invalid size".to_string();
    }

    let mut exponent = 0;
    let mut next_unit: u128 = 1024;
    while exponent + 1 < SIZE_UNITS.len() && bytes as u128 >= next_unit {
        exponent += 1;
        next_unit *= 1024;
    }
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);

    // Round to the requested precision, then let f64's Display drop zeros.
    let rounded: f64 = format!("{:.*}", decimals, scaled)
        .parse()
        .unwrap_or(scaled);
    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// Final segment of a server path, used as the suggested download name.
///
/// Both `/` and `\` count as separators. Returns [`FALLBACK_FILE_NAME`]
/// when the path is empty or ends in a separator.
pub fn file_name_from_path(path: &str) -> &str {
    match path.rsplit(['/', '\\']).next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => FALLBACK_FILE_NAME,
    }
}
