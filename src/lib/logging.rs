//! Formatting and log helpers shared by record rendering and diagnostics.

use log::debug;

/// Formats an integer with comma thousands separators.
///
/// # Examples
///
/// ```
/// use bamrec::logging::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(-1000), "-1,000");
/// assert_eq!(format_count(999), "999");
/// ```
#[must_use]
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join(",");
    if n < 0 { format!("-{grouped}") } else { grouped }
}

/// Logs a structural rebuild of a record buffer at debug level.
pub(crate) fn log_rebuild(what: &str, name: &[u8], old_len: usize, new_len: usize) {
    debug!(
        "Rebuilt record {} after {what}: {} -> {} bytes",
        String::from_utf8_lossy(name),
        format_count(old_len as i64),
        format_count(new_len as i64)
    );
}
