//! Display and file-name helpers

/// Format a playback position in milliseconds as `m:ss`
pub fn format_position(position_ms: u64) -> String {
    let total_seconds = position_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Turn a track title into a safe file stem
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, and the result is
/// lowercased.
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
