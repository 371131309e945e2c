//! Caption text fitting.
//!
//! Lines are wrapped to a character budget estimated from the average glyph
//! width of the whole string, not by measuring every candidate line. For
//! proportional fonts a line of wide glyphs can therefore exceed the target
//! width slightly; for monospace faces the estimate is exact.

use crate::fonts::StandardFont;

/// Anything that can report the rendered width of a string.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: StandardFont, size: f32) -> f32;
}

/// Measures with the built-in AFM width tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct AfmMeasure;

impl TextMeasure for AfmMeasure {
    fn text_width(&self, text: &str, font: StandardFont, size: f32) -> f32 {
        font.text_width(text, size)
    }
}

/// A display line together with its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub text: String,
    pub width: f32,
}

impl RenderedLine {
    /// X offset that centres this line inside a box of `box_width`.
    pub fn centered_x(&self, left: f32, box_width: f32) -> f32 {
        left + (box_width - self.width) / 2.0
    }
}

/// Wrap `text` into lines that fit `target_width` at the given font and size.
///
/// Blank input yields no lines.
pub fn wrap<M: TextMeasure + ?Sized>(
    text: &str,
    font: StandardFont,
    size: f32,
    target_width: f32,
    measure: &M,
) -> Vec<RenderedLine> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let limit = char_budget(text, font, size, target_width, measure);
    wrap_chars(text, limit)
        .into_iter()
        .map(|line| {
            let width = measure.text_width(&line, font, size);
            RenderedLine { text: line, width }
        })
        .collect()
}

/// Characters per line implied by the average glyph width of `text`.
pub fn char_budget<M: TextMeasure + ?Sized>(
    text: &str,
    font: StandardFont,
    size: f32,
    target_width: f32,
    measure: &M,
) -> usize {
    let total = measure.text_width(text, font, size);
    let count = text.chars().count();
    if total <= 0.0 {
        return count.max(1);
    }
    let budget = (count as f32 / total * target_width).floor();
    if budget < 1.0 { 1 } else { budget as usize }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Runs of whitespace collapse to one space between words. Hyphenated words
/// may break after a hyphen that sits between two letters or digits. A piece
/// longer than `width` first fills whatever room is left on the current line
/// and then continues in `width`-sized pieces.
pub fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for (i, piece) in hyphen_pieces(word).into_iter().enumerate() {
            let piece_len = piece.chars().count();
            // Pieces of one word join without a space.
            let sep = usize::from(current_len > 0 && i == 0);

            if current_len + sep + piece_len <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(piece);
                current_len += sep + piece_len;
                continue;
            }

            if piece_len <= width {
                lines.push(std::mem::take(&mut current));
                current.push_str(piece);
                current_len = piece_len;
                continue;
            }

            // Longer than a whole line: split it across lines.
            let mut rest: Vec<char> = piece.chars().collect();
            if current_len > 0 {
                let room = width.saturating_sub(current_len + sep);
                if room > 0 {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.extend(rest.drain(..room));
                }
                lines.push(std::mem::take(&mut current));
            }
            while rest.len() > width {
                lines.push(rest.drain(..width).collect());
            }
            current = rest.into_iter().collect();
            current_len = current.chars().count();
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Split `word` after every hyphen flanked by alphanumerics ("Jay-Z" gives
/// "Jay-" and "Z").
fn hyphen_pieces(word: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = word.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '-'
            && prev.is_some_and(char::is_alphanumeric)
            && chars.peek().is_some_and(|&(_, next)| next.is_alphanumeric())
        {
            let end = idx + ch.len_utf8();
            pieces.push(&word[start..end]);
            start = end;
        }
        prev = Some(ch);
    }
    pieces.push(&word[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap("ABBA", StandardFont::Helvetica, 10.0, 128.0, &AfmMeasure);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "ABBA");
        assert!((lines[0].width - 26.68).abs() < 1e-3);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(wrap("   ", StandardFont::Helvetica, 10.0, 100.0, &AfmMeasure).is_empty());
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_chars("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn long_words_fill_then_break() {
        assert_eq!(wrap_chars("ab verylongword", 5), vec!["ab ve", "rylon", "gword"]);
        assert_eq!(wrap_chars("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn hyphenated_words_break_after_the_hyphen() {
        assert_eq!(
            wrap_chars("Jay-Z Blue-Ivy", 6),
            vec!["Jay-Z", "Blue-", "Ivy"]
        );
        assert_eq!(wrap_chars("well-known", 20), vec!["well-known"]);
        assert_eq!(wrap_chars("a--b -x", 4), vec!["a--b", "-x"]);
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(wrap_chars("a    b\tc", 80), vec!["a b c"]);
    }

    #[test]
    fn budget_is_average_width_estimate() {
        // Courier 10pt: 6pt per glyph, 63pt target => 10 characters.
        let budget = char_budget("anything", StandardFont::Courier, 10.0, 63.0, &AfmMeasure);
        assert_eq!(budget, 10);
        let tiny = char_budget("abc", StandardFont::Courier, 10.0, 1.0, &AfmMeasure);
        assert_eq!(tiny, 1);
    }

    #[test]
    fn monospace_lines_never_exceed_target() {
        let text = "Bohemian Rhapsody is a song by the British rock band Queen \
                    Supercalifragilisticexpialidocious";
        for target in [20.0f32, 47.5, 80.0, 128.4, 300.0] {
            for line in wrap(text, StandardFont::Courier, 10.0, target, &AfmMeasure) {
                assert!(
                    line.width <= target + 1e-3 || line.text.chars().count() == 1,
                    "line {:?} ({}pt) exceeds {}pt",
                    line.text,
                    line.width,
                    target
                );
            }
        }
    }

    #[test]
    fn centering_offset() {
        let line = RenderedLine {
            text: "x".into(),
            width: 20.0,
        };
        assert_eq!(line.centered_x(100.0, 120.0), 150.0);
    }
}
