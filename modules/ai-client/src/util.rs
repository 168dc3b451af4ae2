/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of model text for log fields.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let cut = truncate_to_char_boundary(s, max_bytes);
    let mut out = cut.replace('\n', " ");
    if cut.len() < s.len() {
        out.push('…');
    }
    out
}
