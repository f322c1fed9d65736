//! Converting line ranges into byte ranges.

use serde::{Deserialize, Serialize};

/// A half-open byte range of a text and the text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Byte offset of the first selected character.
    pub start: usize,
    /// Byte offset one past the last selected character.
    pub end: usize,
    /// The covered text.
    pub selected_text: String,
}

/// Selects lines `start_line..=end_line` (1-based) of `text`.
///
/// Out-of-range numbers are clamped to the lines that exist, and a reversed
/// range collapses to its start line. The newline ending the last selected
/// line is not part of the selection. Empty text yields an empty selection
/// at offset 0.
#[must_use]
pub fn locate_lines(text: &str, start_line: usize, end_line: usize) -> Selection {
    if text.is_empty() {
        return Selection {
            start: 0,
            end: 0,
            selected_text: String::new(),
        };
    }

    // Byte offset where each line starts.
    let starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let count = starts.len();

    let first = start_line.clamp(1, count);
    let last = end_line.clamp(first, count);

    let start = starts[first - 1];
    let end = starts.get(last).map_or(text.len(), |next| next - 1);

    Selection {
        start,
        end,
        selected_text: text[start..end].to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "L1\nL2\nL3\nL4";

    #[test]
    fn selects_inner_lines() {
        let sel = locate_lines(DOC, 2, 3);
        assert_eq!((sel.start, sel.end), (3, 8));
        assert_eq!(sel.selected_text, "L2\nL3");
    }

    #[test]
    fn selects_last_line_to_end() {
        assert_eq!(locate_lines(DOC, 4, 4).selected_text, "L4");
        assert_eq!(locate_lines(DOC, 1, 4).selected_text, DOC);
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(locate_lines(DOC, 0, 99).selected_text, DOC);
        assert_eq!(locate_lines(DOC, 9, 12).selected_text, "L4");
        assert_eq!(locate_lines(DOC, 3, 1).selected_text, "L3");
    }

    #[test]
    fn trailing_newline_has_an_empty_last_line() {
        let sel = locate_lines("a\n", 2, 2);
        assert_eq!((sel.start, sel.end), (2, 2));
        assert_eq!(locate_lines("a\n", 1, 1).selected_text, "a");
    }

    #[test]
    fn empty_text() {
        let sel = locate_lines("", 1, 3);
        assert_eq!((sel.start, sel.end), (0, 0));
        assert!(sel.selected_text.is_empty());
    }

    #[test]
    fn multibyte_lines() {
        let sel = locate_lines("añb\nçd\ne", 2, 2);
        assert_eq!(sel.selected_text, "çd");
    }
}
