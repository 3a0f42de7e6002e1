//! Grapheme-aware cursor movement and width helpers for the modal
//! editors and row truncation.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Byte offset of the grapheme boundary before `pos` (0 if at start)
pub fn prev_boundary(s: &str, pos: usize) -> usize {
    s.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|&i| i < pos)
        .last()
        .unwrap_or(0)
}

/// Byte offset of the grapheme boundary after `pos` (len if at end)
pub fn next_boundary(s: &str, pos: usize) -> usize {
    s.grapheme_indices(true)
        .map(|(i, _)| i)
        .find(|&i| i > pos)
        .unwrap_or(s.len())
}

/// Terminal display width
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to at most `max` display columns, appending `…` when cut
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if display_width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        if used + w > max.saturating_sub(1) {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push('…');
    out
}

/// Greedy word wrap to `width` display columns. Words longer than the
/// width are split hard.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut line = String::new();
        let mut used = 0;
        for word in raw.split_whitespace() {
            let w = display_width(word);
            if used == 0 {
                if w <= width {
                    line.push_str(word);
                    used = w;
                } else {
                    // Hard-split an overlong word
                    let mut piece = String::new();
                    let mut piece_w = 0;
                    for g in word.graphemes(true) {
                        let gw = UnicodeWidthStr::width(g);
                        if piece_w + gw > width {
                            lines.push(piece.clone());
                            piece.clear();
                            piece_w = 0;
                        }
                        piece.push_str(g);
                        piece_w += gw;
                    }
                    line = piece;
                    used = piece_w;
                }
            } else if used + 1 + w <= width {
                line.push(' ');
                line.push_str(word);
                used += 1 + w;
            } else {
                lines.push(line.clone());
                line.clear();
                line.push_str(word);
                used = w;
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_step_over_multibyte_graphemes() {
        let s = "a\u{1F600}b";
        let after_a = next_boundary(s, 0);
        assert_eq!(after_a, 1);
        let after_emoji = next_boundary(s, after_a);
        assert_eq!(&s[after_a..after_emoji], "\u{1F600}");
        assert_eq!(prev_boundary(s, after_emoji), after_a);
        assert_eq!(prev_boundary(s, 0), 0);
        assert_eq!(next_boundary(s, s.len()), s.len());
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_preserves_blank_lines() {
        let lines = wrap("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 8), "hello w…");
        assert_eq!(truncate_to_width("short", 8), "short");
    }
}
