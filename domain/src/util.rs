//! Shared utility functions.

/// Marker appended to a shortened preview.
pub const ELLIPSIS: &str = "...";

/// One-line preview of a prompt or provider message for logs and error text.
///
/// Line breaks and runs of whitespace collapse to single spaces. Text longer
/// than `max_bytes` is cut on a character boundary and marked with
/// [`ELLIPSIS`].
pub fn preview(text: &str, max_bytes: usize) -> String {
    let mut line = String::with_capacity(text.len().min(max_bytes + ELLIPSIS.len()));
    for word in text.split_whitespace() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
        if line.len() > max_bytes {
            break;
        }
    }
    if line.len() <= max_bytes {
        return line;
    }
    let mut end = max_bytes;
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    line.truncate(end);
    line.push_str(ELLIPSIS);
    line
}
