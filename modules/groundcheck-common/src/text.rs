/// Inserted between the head and tail windows when text is cut.
pub const TRUNCATION_MARKER: &str = "\n...[content truncated]...\n";

/// Result of a length-capped cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub truncated: bool,
}

/// Cap `text` at `max_chars` characters, keeping a head and a tail window
/// joined by [`TRUNCATION_MARKER`]. The output of a cut is exactly
/// `max_chars` characters long, so cutting it again is a no-op.
///
/// When the cap is too small to hold the marker the text is head-truncated.
pub fn truncate_head_tail(text: &str, max_chars: usize) -> Truncated {
    let total = text.chars().count();
    if total <= max_chars {
        return Truncated {
            text: text.to_string(),
            truncated: false,
        };
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        return Truncated {
            text: text.chars().take(max_chars).collect(),
            truncated: true,
        };
    }

    let budget = max_chars - marker_len;
    let head_len = budget / 2;
    let tail_len = budget - head_len;

    let head: String = text.chars().take(head_len).collect();
    let tail: String = text.chars().skip(total - tail_len).collect();

    Truncated {
        text: format!("{head}{TRUNCATION_MARKER}{tail}"),
        truncated: true,
    }
}
