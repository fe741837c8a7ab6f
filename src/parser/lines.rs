//! Grouping of text spans into lines.

use super::content::{is_spaceless_script_char, TextSpan};
use crate::model::BBox;

/// Spans whose baselines differ by at most this fraction of the font size
/// share a line.
const LINE_TOLERANCE_FACTOR: f32 = 0.3;

/// A horizontal gap wider than this many font sizes splits a line into two
/// columns.
const GUTTER_FACTOR: f32 = 2.0;

/// A gap wider than this fraction of the average glyph width is a word break.
const WORD_GAP_FACTOR: f32 = 0.2;

/// Spans on one baseline, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    /// Baseline of the first span (top-left origin)
    pub y: f32,
    /// Left edge of the first span
    pub x: f32,
    /// Font size averaged over characters
    pub font_size: f32,
}

impl TextLine {
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let (chars, weighted) = spans.iter().fold((0usize, 0.0f32), |(n, w), s| {
            let len = s.text.chars().count();
            (n + len, w + s.font_size * len as f32)
        });
        let font_size = match (chars, spans.first()) {
            (0, Some(first)) => first.font_size,
            (0, None) => 0.0,
            (n, _) => weighted / n as f32,
        };
        let (x, y) = spans.first().map_or((0.0, 0.0), |s| (s.x, s.y));

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Text of the line, with a space wherever the gap between two spans is
    /// a word break. Adjacent CJK glyphs are never separated.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&TextSpan> = None;

        for span in &self.spans {
            if let Some(prev) = prev {
                if needs_space(prev, span) {
                    out.push(' ');
                }
            }
            out.push_str(&span.text);
            prev = Some(span);
        }
        out
    }

    /// Bounding box covering every span of the line.
    pub fn bbox(&self) -> BBox {
        self.spans
            .iter()
            .map(TextSpan::bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}

fn needs_space(prev: &TextSpan, next: &TextSpan) -> bool {
    let is_space = |c: char| c == ' ' || c == '\u{00A0}';
    if prev.text.ends_with(is_space) || next.text.starts_with(is_space) {
        return false;
    }

    let glyphs = next.text.chars().count();
    let glyph_width = if glyphs > 0 && next.width > 0.0 {
        next.width / glyphs as f32
    } else {
        next.font_size * 0.5
    };
    if next.x - prev.right() <= glyph_width * WORD_GAP_FACTOR {
        return false;
    }

    let cjk_join = prev.text.chars().last().is_some_and(is_spaceless_script_char)
        && next.text.chars().next().is_some_and(is_spaceless_script_char);
    !cjk_join
}

/// Group spans into lines by baseline, top to bottom.
pub fn group_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    for span in spans {
        let breaks = current.first().is_some_and(|anchor| {
            (span.y - anchor.y).abs() > span.font_size * LINE_TOLERANCE_FACTOR
        });
        if breaks {
            lines.push(TextLine::from_spans(std::mem::take(&mut current)));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }
    lines
}

/// Split lines at wide horizontal gaps so that side-by-side columns become
/// separate lines.
pub fn split_at_gutters(lines: Vec<TextLine>) -> Vec<TextLine> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let gutter = line.font_size.max(1.0) * GUTTER_FACTOR;
        let mut piece: Vec<TextSpan> = Vec::new();
        for span in line.spans {
            let wide_gap = piece.last().is_some_and(|p| span.x - p.right() > gutter);
            if wide_gap {
                out.push(TextLine::from_spans(std::mem::take(&mut piece)));
            }
            piece.push(span);
        }
        if !piece.is_empty() {
            out.push(TextLine::from_spans(piece));
        }
    }
    out
}

/// Join lines into a block of text, one line per row, skipping blank lines.
pub fn lines_to_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(TextLine::text)
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 10.0, "Helvetica".to_string())
    }

    #[test]
    fn test_group_into_lines_top_to_bottom() {
        let lines = group_into_lines(vec![
            span("second", 10.0, 200.0),
            span("world", 45.0, 100.0),
            span("hello", 10.0, 101.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "hello world");
        assert_eq!(lines[1].text(), "second");
    }

    #[test]
    fn test_adjacent_spans_not_spaced() {
        // "ab" is 10pt wide, so "cd" starts right where it ends
        let line = TextLine::from_spans(vec![span("ab", 0.0, 50.0), span("cd", 10.0, 50.0)]);
        assert_eq!(line.text(), "abcd");
    }

    #[test]
    fn test_cjk_not_spaced() {
        let line = TextLine::from_spans(vec![span("漢", 0.0, 50.0), span("字", 20.0, 50.0)]);
        assert_eq!(line.text(), "漢字");
    }

    #[test]
    fn test_existing_space_not_doubled() {
        let line = TextLine::from_spans(vec![span("one ", 0.0, 50.0), span("two", 40.0, 50.0)]);
        assert_eq!(line.text(), "one two");
    }

    #[test]
    fn test_split_at_gutters() {
        let lines = group_into_lines(vec![
            span("left", 10.0, 100.0),
            span("right", 300.0, 100.0),
        ]);
        assert_eq!(lines.len(), 1);

        let split = split_at_gutters(lines);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].text(), "left");
        assert_eq!(split[1].text(), "right");
    }

    #[test]
    fn test_line_bbox() {
        let line = TextLine::from_spans(vec![span("ab", 0.0, 50.0), span("cd", 10.0, 50.0)]);
        assert_eq!(line.bbox(), BBox::new(0.0, 42.0, 20.0, 52.0));
        assert_eq!(line.font_size, 10.0);
    }

    #[test]
    fn test_lines_to_text() {
        let lines = group_into_lines(vec![span("one", 0.0, 10.0), span("two", 0.0, 30.0)]);
        assert_eq!(lines_to_text(&lines), "one\ntwo");
        assert!(group_into_lines(Vec::new()).is_empty());
    }
}
