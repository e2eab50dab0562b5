//! Grapheme and word boundaries over the plain-text mirror.
//!
//! Boundaries never cross a paragraph, so each lookup only segments the paragraph that contains
//! the offset. All offsets are document (char) offsets.

use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

/// Paragraph containing `offset`, as `(start offset, text)`.
fn paragraph_at(rope: &Rope, offset: usize) -> (usize, String) {
    let line = rope.char_to_line(offset.min(rope.len_chars()));
    (rope.line_to_char(line), rope.line(line).to_string())
}

/// Char offsets of every grapheme boundary in `text`, including 0 and the end.
fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut out = Vec::with_capacity(text.len() + 1);
    let mut chars = 0;
    out.push(0);
    for grapheme in text.graphemes(true) {
        chars += grapheme.chars().count();
        out.push(chars);
    }
    out
}

/// Largest grapheme boundary `<= offset`.
pub(crate) fn snap_grapheme_floor(rope: &Rope, offset: usize) -> usize {
    let offset = offset.min(rope.len_chars());
    let (start, text) = paragraph_at(rope, offset);
    let rel = offset - start;
    grapheme_boundaries(&text)
        .into_iter()
        .take_while(|&b| b <= rel)
        .last()
        .map_or(offset, |b| start + b)
}

/// Smallest grapheme boundary `>= offset`.
pub(crate) fn snap_grapheme_ceil(rope: &Rope, offset: usize) -> usize {
    let offset = offset.min(rope.len_chars());
    let (start, text) = paragraph_at(rope, offset);
    let rel = offset - start;
    grapheme_boundaries(&text)
        .into_iter()
        .find(|&b| b >= rel)
        .map_or(offset, |b| start + b)
}

/// Boundary one grapheme before `offset`.
pub(crate) fn prev_grapheme_boundary(rope: &Rope, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    let offset = offset.min(rope.len_chars());
    let (start, text) = paragraph_at(rope, offset - 1);
    let rel = offset - start;
    grapheme_boundaries(&text)
        .into_iter()
        .take_while(|&b| b < rel)
        .last()
        .map_or(offset - 1, |b| start + b)
}

/// Boundary one grapheme after `offset`.
pub(crate) fn next_grapheme_boundary(rope: &Rope, offset: usize) -> usize {
    let len = rope.len_chars();
    if offset >= len {
        return len;
    }
    let (start, text) = paragraph_at(rope, offset);
    let rel = offset - start;
    grapheme_boundaries(&text)
        .into_iter()
        .find(|&b| b > rel)
        .map_or(offset + 1, |b| start + b)
}

/// Non-whitespace word segments of `text` as char ranges.
fn word_segments(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut chars = 0;
    for (_, segment) in text.split_word_bound_indices() {
        let len = segment.chars().count();
        if !segment.chars().all(char::is_whitespace) {
            out.push((chars, chars + len));
        }
        chars += len;
    }
    out
}

/// Start of the word before `offset`, skipping whitespace.
///
/// At a paragraph start the boundary is the preceding `'\n'`.
pub(crate) fn prev_word_boundary(rope: &Rope, offset: usize) -> usize {
    let offset = offset.min(rope.len_chars());
    if offset == 0 {
        return 0;
    }
    let (start, text) = paragraph_at(rope, offset);
    if start == offset {
        return offset - 1;
    }
    let rel = offset - start;
    word_segments(&text)
        .into_iter()
        .map(|(s, _)| s)
        .filter(|&s| s < rel)
        .last()
        .map_or(start, |s| start + s)
}

/// End of the word after `offset`, skipping whitespace.
///
/// At a paragraph end the boundary is just past its `'\n'`.
pub(crate) fn next_word_boundary(rope: &Rope, offset: usize) -> usize {
    let len = rope.len_chars();
    let offset = offset.min(len);
    if offset == len {
        return len;
    }
    let (start, text) = paragraph_at(rope, offset);
    let rel = offset - start;
    let content_len = text.trim_end_matches('\n').chars().count();
    if rel >= content_len {
        return (start + text.chars().count()).min(len);
    }
    word_segments(&text)
        .into_iter()
        .map(|(_, e)| e)
        .find(|&e| e > rel && e <= content_len)
        .map_or(start + content_len, |e| start + e)
}

/// Paragraph bounds around `offset`: `(start, end)` where `end` excludes the trailing `'\n'`.
pub(crate) fn paragraph_bounds(rope: &Rope, offset: usize) -> (usize, usize) {
    let (start, text) = paragraph_at(rope, offset);
    let content_len = text.trim_end_matches('\n').chars().count();
    (start, start + content_len)
}

/// Largest prefix of `text` (in chars) not exceeding `max_chars` that ends on a grapheme boundary.
pub(crate) fn clip_to_graphemes(text: &str, max_chars: usize) -> &str {
    let mut chars = 0;
    let mut end = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let n = grapheme.chars().count();
        if chars + n > max_chars {
            break;
        }
        chars += n;
        end = idx + grapheme.len();
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_steps_over_emoji_modifier() {
        // thumbs up + skin tone modifier is one cluster of two chars
        let rope = Rope::from_str("a\u{1F44D}\u{1F3FD}b");
        assert_eq!(next_grapheme_boundary(&rope, 1), 3);
        assert_eq!(prev_grapheme_boundary(&rope, 3), 1);
        assert_eq!(snap_grapheme_floor(&rope, 2), 1);
        assert_eq!(snap_grapheme_ceil(&rope, 2), 3);
    }

    #[test]
    fn test_grapheme_combining_mark() {
        let rope = Rope::from_str("e\u{301}x");
        assert_eq!(next_grapheme_boundary(&rope, 0), 2);
        assert_eq!(prev_grapheme_boundary(&rope, 2), 0);
    }

    #[test]
    fn test_grapheme_across_paragraph_break() {
        let rope = Rope::from_str("ab\ncd");
        assert_eq!(prev_grapheme_boundary(&rope, 3), 2);
        assert_eq!(next_grapheme_boundary(&rope, 2), 3);
    }

    #[test]
    fn test_word_boundaries() {
        let rope = Rope::from_str("hello world\nnext");
        assert_eq!(next_word_boundary(&rope, 0), 5);
        assert_eq!(next_word_boundary(&rope, 5), 11);
        assert_eq!(next_word_boundary(&rope, 11), 12);
        assert_eq!(prev_word_boundary(&rope, 11), 6);
        assert_eq!(prev_word_boundary(&rope, 6), 0);
        assert_eq!(prev_word_boundary(&rope, 12), 11);
        assert_eq!(prev_word_boundary(&rope, 16), 12);
    }

    #[test]
    fn test_clip_keeps_clusters_whole() {
        assert_eq!(clip_to_graphemes("ab\u{1F44D}\u{1F3FD}", 3), "ab");
        assert_eq!(clip_to_graphemes("abc", 5), "abc");
        assert_eq!(clip_to_graphemes("abc", 0), "");
    }

    #[test]
    fn test_paragraph_bounds_excludes_newline() {
        let rope = Rope::from_str("ab\ncd");
        assert_eq!(paragraph_bounds(&rope, 1), (0, 2));
        assert_eq!(paragraph_bounds(&rope, 4), (3, 5));
    }
}
