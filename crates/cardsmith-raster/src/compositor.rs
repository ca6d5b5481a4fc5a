//! Image composition
//!
//! Scales decoded images into target rectangles while preserving aspect
//! ratio, and draws the artwork region with its placeholder fallbacks.

use crate::assets::{decode_artwork, is_image_data_uri};
use crate::config::CardLayout;
use crate::typeface::{TextStyle, Typeface};
use cardsmith_core::{ArtworkOutcome, Canvas, Color, PlaceholderKind, Rect, RoundedRect};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::warn;

const PLACEHOLDER_BORDER: Color = Color::rgb(0x55, 0x55, 0x55);
const MISSING_LABEL_COLOR: Color = Color::rgb(0x77, 0x77, 0x77);
const FAILED_LABEL_COLOR: Color = Color::rgb(0x55, 0x55, 0x55);

/// Label drawn when no artwork was supplied
pub const MISSING_LABEL: &str = "无插画";
/// Label drawn when the artwork could not be decoded
pub const DECODE_FAILED_LABEL: &str = "插画加载失败";

/// Largest rectangle with the source aspect ratio that fits `target`, centered
pub fn fit_and_center(src_width: u32, src_height: u32, target: Rect) -> Rect {
    if src_width == 0 || src_height == 0 {
        return Rect::new(target.x, target.y, 0.0, 0.0);
    }

    let scale = (target.width / src_width as f32).min(target.height / src_height as f32);
    let draw_w = (src_width as f32 * scale).round();
    let draw_h = (src_height as f32 * scale).round();
    let dx = target.x + ((target.width - draw_w) / 2.0).round();
    let dy = target.y + ((target.height - draw_h) / 2.0).round();

    Rect::new(dx, dy, draw_w, draw_h)
}

/// Scale `image` into `target` and draw it; returns the rectangle covered
pub fn draw_image_fit(canvas: &mut Canvas, image: &RgbaImage, target: Rect) -> Rect {
    let dest = fit_and_center(image.width(), image.height(), target);
    let (w, h) = (dest.width as u32, dest.height as u32);
    if w == 0 || h == 0 {
        return dest;
    }

    if (w, h) == image.dimensions() {
        canvas.blit_rgba(dest.x as i32, dest.y as i32, w, h, image.as_raw());
    } else {
        let scaled = imageops::resize(image, w, h, FilterType::Triangle);
        canvas.blit_rgba(dest.x as i32, dest.y as i32, w, h, scaled.as_raw());
    }

    dest
}

/// Draw an icon into a square slot at (x, y)
pub fn draw_icon(canvas: &mut Canvas, icon: &RgbaImage, x: f32, y: f32, size: f32) -> Rect {
    draw_image_fit(canvas, icon, Rect::new(x, y, size, size))
}

/// Draw the placeholder for an artwork region
pub fn draw_placeholder(
    canvas: &mut Canvas,
    face: &Typeface,
    layout: &CardLayout,
    kind: PlaceholderKind,
) {
    let art = layout.art;
    let label_at = (art.x + 16.0, art.y + 28.0);

    match kind {
        PlaceholderKind::Missing => {
            canvas.stroke_dashed_rect(art.inset(8.0), PLACEHOLDER_BORDER, 2.0, 6.0, 6.0);
            let style = TextStyle::new(layout.art_label_size, MISSING_LABEL_COLOR);
            face.draw(canvas, MISSING_LABEL, label_at.0, label_at.1, style);
        }
        PlaceholderKind::DecodeFailed => {
            let style = TextStyle::new(layout.art_label_size, FAILED_LABEL_COLOR);
            face.draw(canvas, DECODE_FAILED_LABEL, label_at.0, label_at.1, style);
        }
    }
}

/// Draw the artwork region: a clipped rounded rectangle holding the image or a placeholder
///
/// Never fails; a missing or broken image only changes what the region shows.
pub async fn composite_artwork(
    canvas: &mut Canvas,
    face: &Typeface,
    layout: &CardLayout,
    art: &str,
) -> ArtworkOutcome {
    let decoded = if is_image_data_uri(art) {
        match decode_artwork(art).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "Artwork decode failed, drawing placeholder");
                None
            }
        }
    } else {
        None
    };

    canvas.set_clip(RoundedRect::new(layout.art, layout.art_radius));
    canvas.fill_rect(layout.art, layout.art_fill);

    let outcome = match decoded {
        Some(image) => ArtworkOutcome::Drawn {
            rect: draw_image_fit(canvas, &image, layout.art),
        },
        None => {
            let kind = if is_image_data_uri(art) {
                PlaceholderKind::DecodeFailed
            } else {
                PlaceholderKind::Missing
            };
            draw_placeholder(canvas, face, layout, kind);
            ArtworkOutcome::Placeholder(kind)
        }
    };

    canvas.clear_clip();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::png_data_uri;
    use crate::config::RendererConfig;
    use image::Rgba;

    #[test]
    fn test_tall_image_into_wide_rect() {
        // 1:2 source into a 2:1 target is height-limited
        let target = Rect::new(10.0, 20.0, 200.0, 100.0);
        let dest = fit_and_center(100, 200, target);

        assert_eq!(dest.height, 100.0);
        assert_eq!(dest.width, 50.0);
        assert_eq!(dest.y, 20.0);
        assert_eq!(dest.x, 10.0 + 75.0);
        assert!(dest.x > target.x);
        assert_eq!(target.right() - dest.right(), dest.x - target.x);
    }

    #[test]
    fn test_fit_preserves_aspect() {
        let target = Rect::new(40.0, 96.0, 805.0, 540.0);
        for (w, h) in [(640, 480), (300, 900), (1920, 1080), (17, 3), (805, 540)] {
            let dest = fit_and_center(w, h, target);
            let src_ratio = w as f32 / h as f32;
            let dst_ratio = dest.width / dest.height;
            // within one pixel of rounding on the shorter side
            let tolerance = src_ratio / dest.width.min(dest.height);
            assert!((src_ratio - dst_ratio).abs() <= tolerance + 0.01, "{w}x{h}");
            assert!(dest.width <= target.width && dest.height <= target.height);
            assert!(dest.x >= target.x && dest.y >= target.y);
        }
    }

    #[test]
    fn test_degenerate_source() {
        let dest = fit_and_center(0, 10, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(dest.width, 0.0);
    }

    #[test]
    fn test_draw_image_fit_covers_dest_only() {
        let mut canvas = Canvas::new(40, 20);
        let image = RgbaImage::from_pixel(10, 20, Rgba([255, 0, 0, 255]));
        let dest = draw_image_fit(&mut canvas, &image, Rect::new(0.0, 0.0, 40.0, 20.0));

        assert_eq!(dest, Rect::new(15.0, 0.0, 10.0, 20.0));
        assert_eq!(canvas.get_pixel(20, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(5, 10).unwrap()[3], 0);
        assert_eq!(canvas.get_pixel(35, 10).unwrap()[3], 0);
    }

    #[tokio::test]
    async fn test_missing_art_draws_placeholder() {
        let layout = RendererConfig::default().layout();
        let mut canvas = Canvas::new(885, 1290);

        let outcome = composite_artwork(&mut canvas, &Typeface::Fallback, &layout, "").await;
        assert_eq!(outcome, ArtworkOutcome::Placeholder(PlaceholderKind::Missing));

        // region filled, outside untouched, dashed border present
        assert_eq!(canvas.get_pixel(400, 400), Some([0x22, 0x22, 0x22, 255]));
        assert_eq!(canvas.get_pixel(20, 400).unwrap()[3], 0);
        assert_eq!(canvas.get_pixel(50, 104), Some([0x55, 0x55, 0x55, 255]));
        assert!(canvas.clip().is_none());
    }

    #[tokio::test]
    async fn test_non_image_uri_is_missing() {
        let layout = RendererConfig::default().layout();
        let mut canvas = Canvas::new(885, 1290);
        let outcome =
            composite_artwork(&mut canvas, &Typeface::Fallback, &layout, "https://x/y.png").await;
        assert_eq!(outcome, ArtworkOutcome::Placeholder(PlaceholderKind::Missing));
    }

    #[tokio::test]
    async fn test_corrupt_art_is_decode_failed() {
        let layout = RendererConfig::default().layout();
        let mut canvas = Canvas::new(885, 1290);
        let outcome = composite_artwork(
            &mut canvas,
            &Typeface::Fallback,
            &layout,
            "data:image/png;base64,aGVsbG8=",
        )
        .await;
        assert_eq!(
            outcome,
            ArtworkOutcome::Placeholder(PlaceholderKind::DecodeFailed)
        );
        // no dashed border for decode failures
        assert_eq!(canvas.get_pixel(50, 104), Some([0x22, 0x22, 0x22, 255]));
    }

    #[tokio::test]
    async fn test_artwork_is_clipped_to_rounded_rect() {
        let layout = RendererConfig::default().layout();
        let mut canvas = Canvas::new(885, 1290);
        let art = RgbaImage::from_pixel(805, 540, Rgba([0, 200, 0, 255]));
        let uri = png_data_uri(&art).unwrap();

        let outcome = composite_artwork(&mut canvas, &Typeface::Fallback, &layout, &uri).await;
        assert_eq!(
            outcome,
            ArtworkOutcome::Drawn {
                rect: Rect::new(40.0, 96.0, 805.0, 540.0)
            }
        );
        assert_eq!(canvas.get_pixel(400, 300), Some([0, 200, 0, 255]));
        // rounded corner stays clear
        assert_eq!(canvas.get_pixel(40, 96).unwrap()[3], 0);
    }
}
