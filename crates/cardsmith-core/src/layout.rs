//! Layout geometry shared by the draw stages

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    /// Whether the point lies inside (right and bottom edges exclusive)
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Rectangle with uniformly rounded corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radius: f32,
}

impl RoundedRect {
    /// Create a rounded rectangle; the radius is clamped to half the shorter side
    pub fn new(rect: Rect, radius: f32) -> Self {
        let radius = radius
            .min(rect.width / 2.0)
            .min(rect.height / 2.0)
            .max(0.0);
        Self { rect, radius }
    }

    /// Whether the point lies inside the rounded outline
    pub fn contains(&self, px: f32, py: f32) -> bool {
        if !self.rect.contains(px, py) {
            return false;
        }
        let r = self.radius;
        if r <= 0.0 {
            return true;
        }

        let cx = if px < self.rect.x + r {
            self.rect.x + r
        } else if px > self.rect.right() - r {
            self.rect.right() - r
        } else {
            return true;
        };
        let cy = if py < self.rect.y + r {
            self.rect.y + r
        } else if py > self.rect.bottom() - r {
            self.rect.bottom() - r
        } else {
            return true;
        };

        let dx = px - cx;
        let dy = py - cy;
        dx * dx + dy * dy <= r * r
    }
}

/// Running vertical offset threaded through the draw stages of one render
///
/// The offset never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutCursor {
    y: f32,
}

impl LayoutCursor {
    pub fn new(y: f32) -> Self {
        Self { y: y.max(0.0) }
    }

    /// Current offset
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Move down by `dy`; negative values are ignored
    pub fn advance(&mut self, dy: f32) -> f32 {
        if dy > 0.0 {
            self.y += dy;
        }
        self.y
    }

    /// Move down to at least `y`
    pub fn advance_to(&mut self, y: f32) -> f32 {
        self.y = self.y.max(y);
        self.y
    }
}

/// Why the artwork region shows a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// No artwork supplied (or not an image data URI)
    Missing,
    /// Artwork was supplied but could not be decoded
    DecodeFailed,
}

/// What was drawn into the artwork region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArtworkOutcome {
    /// The image was scaled and drawn into `rect`
    Drawn { rect: Rect },
    /// A placeholder was drawn instead
    Placeholder(PlaceholderKind),
}

/// Record of what one render produced, stage by stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Artwork result (set by the artwork stage)
    pub artwork: Option<ArtworkOutcome>,
    /// Bounds of every tag chip, in draw order
    pub chips: Vec<Rect>,
    /// Number of chip rows used
    pub chip_rows: usize,
    /// Number of ability blocks drawn
    pub ability_blocks: usize,
    /// Lines emitted by the footer wrap
    pub footer_lines: usize,
    /// Cursor value after the last stage
    pub final_cursor: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_radius_clamp() {
        let rr = RoundedRect::new(Rect::new(0.0, 0.0, 40.0, 24.0), 16.0);
        assert_eq!(rr.radius, 12.0);

        let rr = RoundedRect::new(Rect::new(0.0, 0.0, 805.0, 540.0), 16.0);
        assert_eq!(rr.radius, 16.0);
    }

    #[test]
    fn test_rounded_rect_corners_excluded() {
        let rr = RoundedRect::new(Rect::new(0.0, 0.0, 100.0, 100.0), 20.0);
        assert!(!rr.contains(0.5, 0.5));
        assert!(!rr.contains(99.5, 99.5));
        assert!(rr.contains(50.0, 0.5));
        assert!(rr.contains(20.0, 20.0));
        assert!(!rr.contains(100.0, 50.0));
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let mut cursor = LayoutCursor::new(72.0);
        cursor.advance(10.0);
        assert_eq!(cursor.y(), 82.0);

        cursor.advance(-50.0);
        assert_eq!(cursor.y(), 82.0);

        cursor.advance_to(40.0);
        assert_eq!(cursor.y(), 82.0);

        cursor.advance_to(660.0);
        assert_eq!(cursor.y(), 660.0);
    }

    #[test]
    fn test_rect_inset() {
        let r = Rect::new(40.0, 96.0, 805.0, 540.0).inset(8.0);
        assert_eq!(r, Rect::new(48.0, 104.0, 789.0, 524.0));
    }
}
