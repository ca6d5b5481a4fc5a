//! Renderer configuration and template geometry

use cardsmith_core::{Color, Rect};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the ability stage advances the cursor after a wrapped description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorAdvance {
    /// By the number of lines the wrap actually emitted
    #[default]
    WrappedLines,
    /// By `ceil(unwrapped_width / content_width)` lines
    WidthEstimate,
}

/// How the title is placed horizontally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleCentering {
    /// `center_x - chars * font_size / 2`
    #[default]
    Heuristic,
    /// `center_x - measured_width / 2`
    Measured,
}

/// Card renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
    /// Directory holding `<key>.png` icons
    pub icon_dir: PathBuf,
    /// Largest accepted artwork data URI, in bytes
    pub max_art_bytes: usize,
    /// Cursor advance after ability descriptions
    pub cursor_advance: CursorAdvance,
    /// Title placement
    pub title_centering: TitleCentering,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 885,
            height: 1290,
            icon_dir: PathBuf::from("./icons"),
            max_art_bytes: 12 * 1024 * 1024,
            cursor_advance: CursorAdvance::default(),
            title_centering: TitleCentering::default(),
        }
    }
}

impl RendererConfig {
    /// Template geometry for this canvas size
    pub fn layout(&self) -> CardLayout {
        CardLayout::for_canvas(self.width, self.height)
    }
}

/// Fixed template coordinates, derived from the canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub width: f32,
    pub height: f32,

    pub header_height: f32,

    pub title_center_x: f32,
    pub title_y: f32,
    pub title_size: f32,

    pub meta_right: f32,
    pub meta_y: f32,
    pub meta_size: f32,

    pub art: Rect,
    pub art_radius: f32,
    pub art_fill: Color,
    pub art_label_size: f32,

    /// Left edge of the content column
    pub content_x: f32,
    /// Width of the content column
    pub content_width: f32,
    /// Gap between the artwork and the first content row
    pub content_gap: f32,
    pub line_height: f32,

    pub chip_text_size: f32,
    pub chip_height: f32,
    pub chip_radius: f32,
    pub chip_padding: f32,
    pub chip_spacing: f32,
    pub chip_row_height: f32,
    /// Chips wrap once x passes `content_right - chip_wrap_margin`
    pub chip_wrap_margin: f32,
    pub chip_block_advance: f32,
    pub chip_icon_size: f32,

    pub ability_header_size: f32,
    pub ability_header_gap: f32,
    pub ability_text_size: f32,
    pub ability_icon_size: f32,
    pub ability_gap: f32,
    pub ability_block_gap: f32,

    pub footer_y: f32,
    pub footer_line_height: f32,
    pub footer_size: f32,
    pub footer_max_lines: usize,
    pub footer_color: Color,
}

impl CardLayout {
    /// Build the template for a canvas of `width` × `height`
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let art = Rect::new(40.0, 96.0, (w - 80.0).max(0.0), 540.0);
        let padding = 32.0;

        Self {
            width: w,
            height: h,

            header_height: 72.0,

            title_center_x: (w / 2.0).round(),
            title_y: 655.0,
            title_size: 36.0,

            meta_right: w - 24.0,
            meta_y: 1246.0_f32.min(h - 44.0),
            meta_size: 16.0,

            art,
            art_radius: 16.0,
            art_fill: Color::rgb(0x22, 0x22, 0x22),
            art_label_size: 18.0,

            content_x: padding,
            content_width: (w - padding * 2.0).max(0.0),
            content_gap: 24.0,
            line_height: 26.0,

            chip_text_size: 14.0,
            chip_height: 24.0,
            chip_radius: 12.0,
            chip_padding: 9.0,
            chip_spacing: 8.0,
            chip_row_height: 32.0,
            chip_wrap_margin: 120.0,
            chip_block_advance: 40.0,
            chip_icon_size: 16.0,

            ability_header_size: 18.0,
            ability_header_gap: 12.0,
            ability_text_size: 16.0,
            ability_icon_size: 28.0,
            ability_gap: 8.0,
            ability_block_gap: 12.0,

            footer_y: h - 56.0,
            footer_line_height: 18.0,
            footer_size: 12.0,
            footer_max_lines: 3,
            footer_color: Color::rgb(0x31, 0x31, 0x32),
        }
    }

    /// Right edge of the content column
    pub fn content_right(&self) -> f32 {
        self.content_x + self.content_width
    }

    /// First content row, just below the artwork
    pub fn content_top(&self) -> f32 {
        self.art.bottom() + self.content_gap
    }
}
