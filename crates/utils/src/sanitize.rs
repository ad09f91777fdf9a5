//! Path-segment sanitization.
//!
//! The render farm and several DCCs choke on shell-significant characters in
//! folder names, so every resolved template segment is scrubbed before it
//! reaches the filesystem.

/// Characters replaced with `_` in resolved path segments.
pub const SPECIAL_CHARS: [char; 6] = [' ', '-', '\'', '"', '`', '^'];

/// Replaces every occurrence of [`SPECIAL_CHARS`] with `_`.
pub fn sanitize_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| if SPECIAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// True when `raw` contains none of the characters the pipeline rejects.
pub fn is_clean(raw: &str) -> bool {
    !raw.chars().any(|c| SPECIAL_CHARS.contains(&c))
}
