//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Short single-line excerpt, marked with an ellipsis when cut.
pub fn excerpt(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}...", cut.trim_end())
    } else {
        flat
    }
}

/// First sentence of a text (split on `.`, `!` or `?`), or its first
/// `fallback_bytes` when no sentence terminator is present.
pub fn first_sentence(s: &str, fallback_bytes: usize) -> String {
    let trimmed = s.trim();
    match trimmed.find(['.', '!', '?']) {
        Some(end) if end > 0 => trimmed[..end].trim().to_string(),
        _ => truncate_str(trimmed, fallback_bytes).trim().to_string(),
    }
}

/// FNV-1a hash, stable across runs and platforms.
pub fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
