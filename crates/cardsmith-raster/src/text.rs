//! Greedy word wrapping
//!
//! Text is split into paragraphs on newlines, each paragraph into runs of
//! whitespace and non-whitespace, and runs are packed greedily into lines no
//! wider than the limit. A single run wider than the limit gets a line of its
//! own and is never broken further. Lines past `max_lines` are dropped
//! without any continuation marker.

use crate::typeface::{TextStyle, Typeface};
use cardsmith_core::Canvas;

/// Where and how a wrapped block is drawn
#[derive(Debug, Clone, Copy)]
pub struct TextBlock {
    /// Left edge of every line
    pub x: f32,
    /// Vertical middle of the first line
    pub y: f32,
    pub max_width: f32,
    pub line_height: f32,
    /// Line cap; `None` is unbounded
    pub max_lines: Option<usize>,
    pub style: TextStyle,
}

/// Break `text` into lines using `measure` for widths
pub fn wrap_lines(
    text: &str,
    max_width: f32,
    max_lines: Option<usize>,
    measure: impl Fn(&str) -> f32,
) -> Vec<String> {
    let limit = max_lines.unwrap_or(usize::MAX);
    let mut lines = Vec::new();
    if limit == 0 {
        return lines;
    }

    for paragraph in text.split('\n').filter(|p| !p.is_empty()) {
        let mut line = String::new();

        for token in tokens(paragraph) {
            let candidate = format!("{line}{token}");
            if measure(&candidate) > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                if lines.len() >= limit {
                    return lines;
                }
                line.push_str(token.trim_start());
            } else {
                line = candidate;
            }
        }

        if !line.is_empty() {
            lines.push(line);
            if lines.len() >= limit {
                return lines;
            }
        }
    }

    lines
}

/// Wrap and draw `text`; returns the number of lines drawn
pub fn draw_wrapped(canvas: &mut Canvas, face: &Typeface, text: &str, block: &TextBlock) -> usize {
    if text.is_empty() {
        return 0;
    }

    let lines = wrap_lines(text, block.max_width, block.max_lines, |s| {
        face.measure(s, block.style.size)
    });

    let mut y = block.y;
    for line in &lines {
        face.draw(canvas, line, block.x, y, block.style);
        y += block.line_height;
    }

    lines.len()
}

/// Vertical advance estimated from the unwrapped width of `text`
///
/// `ceil(width / content_width) * line_height`. This ignores paragraph breaks
/// and word boundaries, so it only approximates the wrapped height.
pub fn estimate_height(
    face: &Typeface,
    text: &str,
    size: f32,
    content_width: f32,
    line_height: f32,
) -> f32 {
    if content_width <= 0.0 {
        return 0.0;
    }
    (face.measure(text, size) / content_width).ceil() * line_height
}

/// Alternating runs of whitespace and non-whitespace
fn tokens(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, c) in paragraph.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                out.push(&paragraph[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < paragraph.len() {
        out.push(&paragraph[start..]);
    }

    out
}
