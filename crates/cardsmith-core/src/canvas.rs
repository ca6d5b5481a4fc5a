//! Drawing surface
//!
//! An RGBA8 pixel buffer with the handful of primitives the card template
//! needs: fills, gradients, rounded rectangles, dashed outlines, alpha masks
//! and image blits. An optional rounded-rectangle clip restricts every write.

use crate::layout::{Rect, RoundedRect};
use crate::style::Color;

/// RGBA8 drawing surface owned by one render
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw pixel data, row-major RGBA
    pub data: Vec<u8>,
    clip: Option<RoundedRect>,
}

impl Canvas {
    /// Create a transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            clip: None,
        }
    }

    /// Get pixel at position
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Overwrite a pixel, ignoring the clip
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Restrict subsequent drawing to a rounded rectangle
    pub fn set_clip(&mut self, clip: RoundedRect) {
        self.clip = Some(clip);
    }

    /// Remove the clip
    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    /// Current clip, if any
    pub fn clip(&self) -> Option<&RoundedRect> {
        self.clip.as_ref()
    }

    /// Alpha-blend `color` over the pixel, scaled by `coverage` (0-1)
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        if let Some(clip) = &self.clip {
            if !clip.contains(x as f32 + 0.5, y as f32 + 0.5) {
                return;
            }
        }

        let src = color.0;
        let src_a = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }

        let idx = self.index(x as u32, y as u32);
        let dst = [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ];
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let blend = |s: u8, d: u8| -> u8 {
            let s = s as f32 / 255.0;
            let d = d as f32 / 255.0;
            let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            (out * 255.0).round().clamp(0.0, 255.0) as u8
        };

        self.data[idx] = blend(src[0], dst[0]);
        self.data[idx + 1] = blend(src[1], dst[1]);
        self.data[idx + 2] = blend(src[2], dst[2]);
        self.data[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Fill entire canvas with a color, ignoring the clip
    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
    }

    /// Fill with a top-to-bottom linear gradient, ignoring the clip
    pub fn fill_vertical_gradient(&mut self, top: Color, bottom: Color) {
        let span = self.height.saturating_sub(1).max(1) as f32;
        for y in 0..self.height {
            let row = top.lerp(bottom, y as f32 / span);
            for x in 0..self.width {
                self.set_pixel(x, y, row.0);
            }
        }
    }

    /// Fill a rectangle (pixel centers inside are covered)
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_where(rect, color, |px, py| rect.contains(px, py));
    }

    /// Fill a rounded rectangle, anti-aliasing the corner arcs
    pub fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Color) {
        let bounds = shape.rect;
        let x0 = bounds.x.floor().max(0.0) as i32;
        let y0 = bounds.y.floor().max(0.0) as i32;
        let x1 = bounds.right().ceil().min(self.width as f32) as i32;
        let y1 = bounds.bottom().ceil().min(self.height as f32) as i32;

        for py in y0..y1 {
            for px in x0..x1 {
                let coverage = pixel_coverage(px, py, |x, y| shape.contains(x, y));
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }

    /// Stroke a solid rectangle outline
    pub fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.stroke_outline(rect, color, line_width, None);
    }

    /// Stroke a rectangle outline with a dash pattern
    ///
    /// The stroke is centered on the outline, `line_width` thick, and
    /// alternates `dash` pixels on and `gap` pixels off. The pattern runs
    /// clockwise from the top-left corner without restarting at each edge.
    pub fn stroke_dashed_rect(
        &mut self,
        rect: Rect,
        color: Color,
        line_width: f32,
        dash: f32,
        gap: f32,
    ) {
        self.stroke_outline(rect, color, line_width, Some((dash, gap)));
    }

    /// Blend a coverage mask (one byte per pixel) with its top-left at (x, y)
    pub fn blend_mask(
        &mut self,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        mask: &[u8],
        color: Color,
    ) {
        for row in 0..height {
            for col in 0..width {
                let coverage = mask[row * width + col];
                if coverage == 0 {
                    continue;
                }
                self.blend_pixel(
                    x + col as i32,
                    y + row as i32,
                    color,
                    coverage as f32 / 255.0,
                );
            }
        }
    }

    /// Alpha-blend an RGBA8 pixel block with its top-left at (x, y)
    pub fn blit_rgba(&mut self, x: i32, y: i32, width: u32, height: u32, pixels: &[u8]) {
        for row in 0..height {
            for col in 0..width {
                let idx = ((row * width + col) * 4) as usize;
                let Some(px) = pixels.get(idx..idx + 4) else {
                    return;
                };
                if px[3] == 0 {
                    continue;
                }
                self.blend_pixel(
                    x + col as i32,
                    y + row as i32,
                    Color([px[0], px[1], px[2], px[3]]),
                    1.0,
                );
            }
        }
    }

    fn stroke_outline(
        &mut self,
        rect: Rect,
        color: Color,
        line_width: f32,
        dashes: Option<(f32, f32)>,
    ) {
        let half = line_width / 2.0;
        let (w, h) = (rect.width, rect.height);
        let on = |t: f32| match dashes {
            Some((dash, gap)) => t.rem_euclid((dash + gap).max(1.0)) < dash,
            None => true,
        };

        let x0 = (rect.x - half).floor() as i32;
        let x1 = (rect.right() + half).ceil() as i32;
        let y0 = (rect.y - half).floor() as i32;
        let y1 = (rect.bottom() + half).ceil() as i32;

        for py in y0..y1 {
            for px in x0..x1 {
                let cx = px as f32 + 0.5;
                let cy = py as f32 + 0.5;
                let within_x = cx >= rect.x - half && cx <= rect.right() + half;
                let within_y = cy >= rect.y - half && cy <= rect.bottom() + half;

                // distance along the perimeter, clockwise from the top-left corner
                let top = within_x && (cy - rect.y).abs() <= half && on(cx - rect.x);
                let right = within_y
                    && (cx - rect.right()).abs() <= half
                    && on(w + cy - rect.y);
                let bottom = within_x
                    && (cy - rect.bottom()).abs() <= half
                    && on(w + h + rect.right() - cx);
                let left = within_y
                    && (cx - rect.x).abs() <= half
                    && on(2.0 * w + h + rect.bottom() - cy);
                let draw = top || right || bottom || left;
                if draw {
                    self.blend_pixel(px, py, color, 1.0);
                }
            }
        }
    }

    fn fill_where(&mut self, bounds: Rect, color: Color, inside: impl Fn(f32, f32) -> bool) {
        let x0 = bounds.x.floor().max(0.0) as i32;
        let y0 = bounds.y.floor().max(0.0) as i32;
        let x1 = bounds.right().ceil().min(self.width as f32) as i32;
        let y1 = bounds.bottom().ceil().min(self.height as f32) as i32;

        for py in y0..y1 {
            for px in x0..x1 {
                if inside(px as f32 + 0.5, py as f32 + 0.5) {
                    self.blend_pixel(px, py, color, 1.0);
                }
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

/// Fraction of the pixel at (px, py) inside a shape, from a 4x4 sample grid
fn pixel_coverage(px: i32, py: i32, inside: impl Fn(f32, f32) -> bool) -> f32 {
    const SAMPLES: u32 = 4;
    let (x, y) = (px as f32, py as f32);

    // interior pixels skip the grid
    if inside(x, y) && inside(x + 1.0, y) && inside(x, y + 1.0) && inside(x + 1.0, y + 1.0) {
        return 1.0;
    }

    let step = 1.0 / SAMPLES as f32;
    let mut hits = 0;
    for sy in 0..SAMPLES {
        for sx in 0..SAMPLES {
            if inside(x + (sx as f32 + 0.5) * step, y + (sy as f32 + 0.5) * step) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SAMPLES * SAMPLES) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_pixels() {
        let mut canvas = Canvas::new(100, 100);
        canvas.set_pixel(50, 50, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(50, 50), Some([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(100, 0), None);
    }

    #[test]
    fn test_blend_over_opaque() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(Color::WHITE);
        canvas.blend_pixel(1, 1, Color::rgba(0, 0, 0, 255), 0.5);

        let px = canvas.get_pixel(1, 1).unwrap();
        assert_eq!(px[3], 255);
        assert!((126..=129).contains(&px[0]));
    }

    #[test]
    fn test_clip_restricts_writes() {
        let mut canvas = Canvas::new(20, 20);
        canvas.set_clip(RoundedRect::new(Rect::new(5.0, 5.0, 10.0, 10.0), 0.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), Color::BLACK);
        canvas.clear_clip();

        assert_eq!(canvas.get_pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(10, 10), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_vertical_gradient() {
        let mut canvas = Canvas::new(2, 11);
        canvas.fill_vertical_gradient(Color::BLACK, Color::WHITE);
        assert_eq!(canvas.get_pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 10), Some([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(0, 5).unwrap()[0], 128);
    }

    #[test]
    fn test_dashed_stroke_has_gaps() {
        let mut canvas = Canvas::new(60, 30);
        canvas.stroke_dashed_rect(Rect::new(5.0, 5.0, 50.0, 20.0), Color::BLACK, 2.0, 6.0, 6.0);

        // along the top edge: on for 6px, off for 6px
        assert_eq!(canvas.get_pixel(7, 5).unwrap()[3], 255);
        assert_eq!(canvas.get_pixel(14, 5).unwrap()[3], 0);
        // interior untouched
        assert_eq!(canvas.get_pixel(30, 15).unwrap()[3], 0);
    }

    #[test]
    fn test_dash_pattern_continues_round_corners() {
        let mut canvas = Canvas::new(60, 30);
        canvas.stroke_dashed_rect(Rect::new(5.0, 5.0, 50.0, 20.0), Color::BLACK, 2.0, 6.0, 6.0);

        // the right edge starts 50px into the pattern, 2px into a dash
        assert_eq!(canvas.get_pixel(55, 6).unwrap()[3], 255);
        assert_eq!(canvas.get_pixel(55, 9).unwrap()[3], 0);
        assert_eq!(canvas.get_pixel(55, 17).unwrap()[3], 255);
    }

    #[test]
    fn test_solid_stroke() {
        let mut canvas = Canvas::new(30, 30);
        canvas.stroke_rect(Rect::new(5.0, 5.0, 20.0, 20.0), Color::BLACK, 2.0);
        assert_eq!(canvas.get_pixel(14, 5).unwrap()[3], 255);
        assert_eq!(canvas.get_pixel(25, 14).unwrap()[3], 255);
        assert_eq!(canvas.get_pixel(15, 15).unwrap()[3], 0);
    }

    #[test]
    fn test_rounded_fill_leaves_corners() {
        let mut canvas = Canvas::new(40, 24);
        canvas.fill_rounded_rect(
            RoundedRect::new(Rect::new(0.0, 0.0, 40.0, 24.0), 12.0),
            Color::BLACK,
        );
        assert_eq!(canvas.get_pixel(0, 0).unwrap()[3], 0);
        assert_eq!(canvas.get_pixel(20, 12).unwrap()[3], 255);
    }

    #[test]
    fn test_rounded_fill_blends_arc_edge() {
        let mut canvas = Canvas::new(40, 24);
        canvas.fill_rounded_rect(
            RoundedRect::new(Rect::new(0.0, 0.0, 40.0, 24.0), 12.0),
            Color::BLACK,
        );
        // the arc crosses this pixel, so it is partially covered
        let alpha = canvas.get_pixel(3, 3).unwrap()[3];
        assert!(alpha > 0 && alpha < 255, "alpha {alpha}");
        // straight edges stay crisp
        assert_eq!(canvas.get_pixel(20, 0).unwrap()[3], 255);
    }
}
