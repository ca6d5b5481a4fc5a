//! Font registration and text measurement
//!
//! A process registers its font once with [`register_fonts`]; every render
//! afterwards shares that read-only [`Typeface`]. When the font cannot be
//! loaded the fallback face is installed instead, so rendering never depends
//! on a font file being present.

use cardsmith_core::{Canvas, Color, Rect};
use fontdue::{Font, FontSettings};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Font shipped next to the service binary
pub const DEFAULT_FONT_PATH: &str = "./fonts/NotoSansSC-Regular.otf";

static REGISTERED: OnceCell<Arc<Typeface>> = OnceCell::new();

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid font data: {0}")]
    Parse(String),
}

/// Size, color and weight of a run of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            bold: false,
        }
    }

    /// Use the bold weight
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Text measurement and drawing primitive
pub enum Typeface {
    /// A parsed outline font
    Font { family: String, font: Font },
    /// Deterministic monospace metrics drawing hollow glyph boxes
    Fallback,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font { family, .. } => f.debug_tuple("Font").field(family).finish(),
            Self::Fallback => f.write_str("Fallback"),
        }
    }
}

/// Register the process-wide font
///
/// Only the first call does any work; later calls return the typeface that
/// was registered first. Failure to load is logged and yields the fallback.
pub fn register_fonts(path: impl AsRef<Path>) -> Arc<Typeface> {
    REGISTERED
        .get_or_init(|| {
            let path = path.as_ref();
            match Typeface::load(path) {
                Ok(face) => {
                    info!(family = face.family(), path = %path.display(), "Font registered");
                    Arc::new(face)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Font not registered, using fallback face");
                    Arc::new(Typeface::Fallback)
                }
            }
        })
        .clone()
}

/// The registered typeface, or the fallback when nothing was registered
pub fn registered() -> Arc<Typeface> {
    REGISTERED
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(Typeface::Fallback))
}

impl Typeface {
    /// Load an outline font from disk
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)?;
        let fallback_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(&bytes, fallback_name)
    }

    /// Parse an outline font from memory
    pub fn from_bytes(bytes: &[u8], fallback_name: impl Into<String>) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let family = font
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| fallback_name.into());
        Ok(Self::Font { family, font })
    }

    /// Family name for logging
    pub fn family(&self) -> &str {
        match self {
            Self::Font { family, .. } => family,
            Self::Fallback => "fallback",
        }
    }

    /// Horizontal advance of `text` at `size` pixels
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            Self::Font { font, .. } => {
                let mut width = 0.0;
                let mut prev = None;
                for c in text.chars() {
                    if let Some(p) = prev {
                        width += font.horizontal_kern(p, c, size).unwrap_or(0.0);
                    }
                    width += font.metrics(c, size).advance_width;
                    prev = Some(c);
                }
                width
            }
            Self::Fallback => text.chars().map(|c| fallback_advance(c, size)).sum(),
        }
    }

    /// Ascent (positive) and descent (negative) at `size` pixels
    pub fn line_metrics(&self, size: f32) -> (f32, f32) {
        let default = (size * 0.8, -(size * 0.2));
        match self {
            Self::Font { font, .. } => font
                .horizontal_line_metrics(size)
                .map(|m| (m.ascent, m.descent))
                .unwrap_or(default),
            Self::Fallback => default,
        }
    }

    /// Draw `text` starting at `x`, vertically centered on `y`; returns the advance
    pub fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, style: TextStyle) -> f32 {
        let (ascent, descent) = self.line_metrics(style.size);
        let baseline = y + (ascent + descent) / 2.0;
        let mut pen_x = x;

        match self {
            Self::Font { font, .. } => {
                let mut prev = None;
                for c in text.chars() {
                    if let Some(p) = prev {
                        pen_x += font.horizontal_kern(p, c, style.size).unwrap_or(0.0);
                    }
                    let (metrics, bitmap) = font.rasterize(c, style.size);
                    let gx = (pen_x + metrics.xmin as f32).round() as i32;
                    let gy = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;
                    canvas.blend_mask(gx, gy, metrics.width, metrics.height, &bitmap, style.color);
                    if style.bold {
                        canvas.blend_mask(gx + 1, gy, metrics.width, metrics.height, &bitmap, style.color);
                    }
                    pen_x += metrics.advance_width;
                    prev = Some(c);
                }
            }
            Self::Fallback => {
                let line_width = if style.bold { 2.0 } else { 1.0 };
                for c in text.chars() {
                    let advance = fallback_advance(c, style.size);
                    if !c.is_whitespace() {
                        let glyph = Rect::new(
                            pen_x + advance * 0.1,
                            baseline - ascent * 0.875,
                            advance * 0.8,
                            ascent * 0.875,
                        );
                        canvas.stroke_rect(glyph, style.color, line_width);
                    }
                    pen_x += advance;
                }
            }
        }

        pen_x - x
    }

    /// Draw `text` so that it ends at `right`
    pub fn draw_right_aligned(
        &self,
        canvas: &mut Canvas,
        text: &str,
        right: f32,
        y: f32,
        style: TextStyle,
    ) -> f32 {
        let width = self.measure(text, style.size);
        self.draw(canvas, text, right - width, y, style)
    }
}

/// Advance of one character in the fallback face
fn fallback_advance(c: char, size: f32) -> f32 {
    if is_wide(c) { size } else { size * 0.6 }
}

/// East Asian wide and fullwidth ranges
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}
