//! Card draw stages
//!
//! One stage per template section, run in a fixed order over a single
//! context. Fixed-position sections (title, metadata) leave the cursor alone;
//! flowing sections (artwork, chips, abilities, footer) move it down.

use crate::assets::AssetSource;
use crate::compositor::{composite_artwork, draw_icon};
use crate::config::{CardLayout, CursorAdvance, RendererConfig, TitleCentering};
use crate::text::{TextBlock, draw_wrapped, estimate_height};
use crate::theme::GRADIENT_END;
use crate::typeface::{TextStyle, Typeface};
use async_trait::async_trait;
use cardsmith_core::{Canvas, Color, Rect, RoundedRect};
use cardsmith_pipeline::{CardContext, CardStage, StageError};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only state shared by every stage of a pipeline
pub struct StageResources {
    pub face: Arc<Typeface>,
    pub assets: Arc<dyn AssetSource>,
    pub layout: CardLayout,
    pub cursor_advance: CursorAdvance,
    pub title_centering: TitleCentering,
}

impl StageResources {
    pub fn new(config: &RendererConfig, face: Arc<Typeface>, assets: Arc<dyn AssetSource>) -> Self {
        Self {
            face,
            assets,
            layout: config.layout(),
            cursor_advance: config.cursor_advance,
            title_centering: config.title_centering,
        }
    }

    /// Load an icon, logging and swallowing failures
    async fn icon(&self, key: &str) -> Option<RgbaImage> {
        match self.assets.load_icon(key).await {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!(key, error = %e, "Icon unavailable, skipping");
                None
            }
        }
    }
}

/// Vertical gradient from the theme background to white
pub struct BackgroundStage;

#[async_trait]
impl CardStage for BackgroundStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let top = context.theme.background;
        context.canvas.fill_vertical_gradient(top, GRADIENT_END);
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "background"
    }
}

/// Accent-colored bar across the top
pub struct HeaderStage {
    resources: Arc<StageResources>,
}

impl HeaderStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl CardStage for HeaderStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let bar = Rect::new(0.0, 0.0, layout.width, layout.header_height);
        context.canvas.fill_rect(bar, context.theme.accent);
        context.cursor.advance_to(layout.header_height);
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "header"
    }
}

/// Card name, bold, roughly centered below the artwork
pub struct TitleStage {
    resources: Arc<StageResources>,
}

impl TitleStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }

    /// Left edge of the title
    pub fn title_x(&self, name: &str) -> f32 {
        let layout = &self.resources.layout;
        let width = match self.resources.title_centering {
            TitleCentering::Heuristic => name.chars().count() as f32 * layout.title_size,
            TitleCentering::Measured => self.resources.face.measure(name, layout.title_size),
        };
        layout.title_center_x - width / 2.0
    }
}

#[async_trait]
impl CardStage for TitleStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let style = TextStyle::new(layout.title_size, Color::BLACK).bold();
        let x = self.title_x(&context.card.name);
        self.resources
            .face
            .draw(&mut context.canvas, &context.card.name, x, layout.title_y, style);
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "title"
    }
}

/// Category and number, right-aligned near the bottom edge
pub struct MetadataStage {
    resources: Arc<StageResources>,
}

impl MetadataStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl CardStage for MetadataStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let text = context.card.metadata_text();
        self.resources.face.draw_right_aligned(
            &mut context.canvas,
            &text,
            layout.meta_right,
            layout.meta_y,
            TextStyle::new(layout.meta_size, Color::BLACK),
        );
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "metadata"
    }

    fn can_skip(&self, context: &CardContext) -> bool {
        context.card.metadata_text().is_empty()
    }
}

/// Clipped artwork region with placeholder fallback
pub struct ArtworkStage {
    resources: Arc<StageResources>,
}

impl ArtworkStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl CardStage for ArtworkStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let outcome = composite_artwork(
            &mut context.canvas,
            &self.resources.face,
            layout,
            &context.card.art,
        )
        .await;
        debug!(?outcome, "Artwork composited");

        context.summary.artwork = Some(outcome);
        context.cursor.advance_to(layout.content_top());
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "artwork"
    }
}

/// Chip placement for one row-wrapped block
#[derive(Debug, Clone, PartialEq)]
pub struct ChipLayout {
    /// Chip bounds in input order
    pub rects: Vec<Rect>,
    /// Rows holding at least one chip
    pub rows: usize,
    /// Cursor value once the block is done
    pub bottom: f32,
}

/// Place chips of the given widths left to right starting at `top`
///
/// After each chip x advances by its width plus spacing; once x passes the
/// wrap threshold it returns to the content edge and the row moves down.
pub fn layout_chips(widths: &[f32], layout: &CardLayout, top: f32) -> ChipLayout {
    let threshold = layout.content_right() - layout.chip_wrap_margin;
    let mut x = layout.content_x;
    let mut y = top;
    let mut rects = Vec::with_capacity(widths.len());
    let mut rows = 0;

    for &width in widths {
        if x == layout.content_x {
            rows += 1;
        }
        rects.push(Rect::new(x, y, width, layout.chip_height));
        x += width + layout.chip_spacing;
        if x > threshold {
            x = layout.content_x;
            y += layout.chip_row_height;
        }
    }

    ChipLayout {
        rects,
        rows,
        bottom: y + layout.chip_block_advance,
    }
}

/// Tag chips in a row-wrapping block
pub struct TagChipStage {
    resources: Arc<StageResources>,
}

impl TagChipStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl CardStage for TagChipStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let res = &self.resources;
        let layout = &res.layout;
        let style = TextStyle::new(layout.chip_text_size, Color::BLACK);
        let icon_extra = layout.chip_icon_size + 4.0;

        let mut chips = Vec::with_capacity(context.card.tags.len());
        for tag in &context.card.tags {
            let icon = res.icon(tag).await;
            let label = format!("#{tag}");
            let mut width = res.face.measure(&label, style.size) + layout.chip_padding * 2.0;
            if icon.is_some() {
                width += icon_extra;
            }
            chips.push((label, icon, width));
        }

        let widths: Vec<f32> = chips.iter().map(|(_, _, w)| *w).collect();
        let placed = layout_chips(&widths, layout, context.cursor.y());

        for ((label, icon, _), rect) in chips.iter().zip(&placed.rects) {
            let canvas = &mut context.canvas;
            canvas.fill_rounded_rect(RoundedRect::new(*rect, layout.chip_radius), Color::WHITE);

            let mut text_x = rect.x + layout.chip_padding;
            if let Some(icon) = icon {
                let icon_y = rect.y + (layout.chip_height - layout.chip_icon_size) / 2.0;
                draw_icon(canvas, icon, text_x, icon_y, layout.chip_icon_size);
                text_x += icon_extra;
            }
            res.face.draw(canvas, label, text_x, rect.y + 16.0, style);
        }

        debug!(chips = placed.rects.len(), rows = placed.rows, "Tag chips drawn");
        context.summary.chip_rows = placed.rows;
        context.summary.chips = placed.rects;
        context.cursor.advance_to(placed.bottom);
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "tags"
    }

    fn can_skip(&self, context: &CardContext) -> bool {
        context.card.tags.is_empty()
    }
}

/// Ability blocks: chance header, then icon, cost and wrapped description rows
pub struct AbilityStage {
    resources: Arc<StageResources>,
}

impl AbilityStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }

    /// Draw one icon/cost/description row centered on `y`; returns the cursor advance
    async fn draw_row(
        &self,
        canvas: &mut Canvas,
        y: f32,
        mode: Option<&str>,
        cost: Option<&str>,
        description: Option<&str>,
    ) -> f32 {
        let res = &self.resources;
        let layout = &res.layout;
        let mut x = layout.content_x;

        if let Some(mode) = mode {
            if let Some(icon) = res.icon(mode).await {
                let top = y - layout.ability_icon_size / 2.0;
                draw_icon(canvas, &icon, x, top, layout.ability_icon_size);
            }
            x += layout.ability_icon_size + layout.ability_gap;
        }

        if let Some(cost) = cost {
            let style = TextStyle::new(layout.ability_text_size, Color::BLACK).bold();
            x += res.face.draw(canvas, cost, x, y, style) + layout.ability_gap;
        }

        let description = description.unwrap_or_default();
        let block = TextBlock {
            x,
            y,
            max_width: (layout.content_right() - x).max(0.0),
            line_height: layout.line_height,
            max_lines: None,
            style: TextStyle::new(layout.ability_text_size, Color::BLACK),
        };
        let lines = draw_wrapped(canvas, &res.face, description, &block);

        match res.cursor_advance {
            CursorAdvance::WrappedLines => lines.max(1) as f32 * layout.line_height,
            CursorAdvance::WidthEstimate => {
                // estimate over everything drawn on the row, never less than one line
                let text = [cost, Some(description)]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                estimate_height(
                    &res.face,
                    &text,
                    layout.ability_text_size,
                    layout.content_width,
                    layout.line_height,
                )
                .max(layout.line_height)
            }
        }
    }
}

#[async_trait]
impl CardStage for AbilityStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let slots: Vec<_> = context.card.abilities().cloned().collect();

        for slot in &slots {
            if let Some(chance) = slot.chance.as_deref().filter(|s| !s.is_empty()) {
                let style = TextStyle::new(layout.ability_header_size, context.theme.accent).bold();
                let y = context.cursor.y();
                self.resources
                    .face
                    .draw(&mut context.canvas, chance, layout.content_x, y, style);
                context.cursor.advance(layout.ability_header_gap);
            }
            context.cursor.advance(layout.line_height);

            let advance = self
                .draw_row(
                    &mut context.canvas,
                    context.cursor.y(),
                    non_empty(&slot.mode),
                    non_empty(&slot.cost),
                    non_empty(&slot.description),
                )
                .await;
            context.cursor.advance(advance);

            if let Some(extra) = slot.populated_extra() {
                let advance = self
                    .draw_row(
                        &mut context.canvas,
                        context.cursor.y(),
                        non_empty(&extra.mode),
                        non_empty(&extra.cost),
                        non_empty(&extra.description),
                    )
                    .await;
                context.cursor.advance(advance);
            }

            context.cursor.advance(layout.ability_block_gap);
            context.summary.ability_blocks += 1;
        }

        Ok(context)
    }

    fn name(&self) -> &'static str {
        "abilities"
    }

    fn can_skip(&self, context: &CardContext) -> bool {
        context.card.abilities().next().is_none()
    }
}

/// Note and copyright, wrapped to at most three lines at the bottom
pub struct FooterStage {
    resources: Arc<StageResources>,
}

impl FooterStage {
    pub fn new(resources: Arc<StageResources>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl CardStage for FooterStage {
    async fn process(&self, mut context: CardContext) -> Result<CardContext, StageError> {
        let layout = &self.resources.layout;
        let block = TextBlock {
            x: layout.content_x,
            y: layout.footer_y,
            max_width: layout.content_width,
            line_height: layout.footer_line_height,
            max_lines: Some(layout.footer_max_lines),
            style: TextStyle::new(layout.footer_size, layout.footer_color),
        };
        let text = context.card.footer_text();
        let lines = draw_wrapped(&mut context.canvas, &self.resources.face, &text, &block);

        context.summary.footer_lines = lines;
        context
            .cursor
            .advance_to(layout.footer_y + lines as f32 * layout.footer_line_height);
        Ok(context)
    }

    fn name(&self) -> &'static str {
        "footer"
    }

    fn can_skip(&self, context: &CardContext) -> bool {
        context.card.footer_text().is_empty()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::IconAtlas;
    use cardsmith_core::{AbilityExtra, AbilitySlot, CardData, Theme};
    use image::Rgba;

    fn resources(config: RendererConfig, atlas: IconAtlas) -> Arc<StageResources> {
        Arc::new(StageResources::new(
            &config,
            Arc::new(Typeface::Fallback),
            Arc::new(atlas),
        ))
    }

    fn context(card: CardData) -> CardContext {
        CardContext::new(card, Theme::default(), 885, 1290)
    }

    #[test]
    fn test_chips_wrap_rows() {
        let layout = RendererConfig::default().layout();
        // threshold is 32 + 821 - 120 = 733
        let widths = [200.0; 6];
        let placed = layout_chips(&widths, &layout, 660.0);

        assert_eq!(placed.rects[0].x, 32.0);
        assert_eq!(placed.rects[1].x, 240.0);
        assert_eq!(placed.rects[2].x, 448.0);
        // 448 + 208 = 656 <= 733, so the fourth chip stays on row one
        assert_eq!(placed.rects[3].x, 656.0);
        assert_eq!(placed.rects[3].y, 660.0);
        // 656 + 208 > 733 wraps
        assert_eq!(placed.rects[4].x, 32.0);
        assert_eq!(placed.rects[4].y, 692.0);
        assert_eq!(placed.rows, 2);
        assert_eq!(placed.bottom, 692.0 + 40.0);
    }

    #[test]
    fn test_single_chip_row() {
        let layout = RendererConfig::default().layout();
        let placed = layout_chips(&[50.0], &layout, 660.0);
        assert_eq!(placed.rows, 1);
        assert_eq!(placed.bottom, 700.0);
        assert!(layout_chips(&[], &layout, 660.0).rects.is_empty());
    }

    #[test]
    fn test_title_centering_modes() {
        let heuristic = TitleStage::new(resources(RendererConfig::default(), IconAtlas::new()));
        // 12 chars * 36 / 2 = 216
        assert_eq!(heuristic.title_x("Shadow Clone"), 443.0 - 216.0);

        let config = RendererConfig {
            title_centering: TitleCentering::Measured,
            ..Default::default()
        };
        let measured = TitleStage::new(resources(config, IconAtlas::new()));
        // fallback: 12 * 0.6 * 36 = 259.2 wide
        assert!((measured.title_x("Shadow Clone") - (443.0 - 129.6)).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_chip_icon_widens_chip() {
        let icon = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let atlas = IconAtlas::new().with_icon("fire", icon);
        let stage = TagChipStage::new(resources(RendererConfig::default(), atlas));
        let mut ctx = context(CardData::new("x").with_tag("fire").with_tag("ice"));
        ctx.cursor.advance_to(660.0);

        let ctx = stage.process(ctx).await.unwrap();
        let chips = &ctx.summary.chips;
        assert_eq!(chips.len(), 2);
        // only the chip with a loaded icon gets the icon allowance
        let fire_label = Typeface::Fallback.measure("#fire", 14.0);
        let ice_label = Typeface::Fallback.measure("#ice", 14.0);
        assert!((chips[0].width - (fire_label + 18.0 + 20.0)).abs() < 0.01);
        assert!((chips[1].width - (ice_label + 18.0)).abs() < 0.01);
        assert_eq!(ctx.cursor.y(), 700.0);
        // icon pixel drawn inside the first chip
        assert_eq!(ctx.canvas.get_pixel(45, 672), Some([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_missing_ability_icon_keeps_offsets() {
        let stage = AbilityStage::new(resources(RendererConfig::default(), IconAtlas::new()));
        let slot = AbilitySlot {
            mode: Some("attack".into()),
            cost: Some("3".into()),
            description: Some("deal damage".into()),
            ..Default::default()
        };
        let mut ctx = context(CardData::new("x").with_ability1(slot));
        ctx.cursor.advance_to(700.0);

        let ctx = stage.process(ctx).await.unwrap();
        assert_eq!(ctx.summary.ability_blocks, 1);
        // row middle at 726; icon slot left blank, cost drawn after it
        let inked = |xs: std::ops::Range<u32>| {
            xs.into_iter()
                .any(|x| (712..740).any(|y| ctx.canvas.get_pixel(x, y).unwrap()[3] > 0))
        };
        assert!(!inked(32..60));
        assert!(inked(68..78));
        // one line plus gap
        assert_eq!(ctx.cursor.y(), 700.0 + 26.0 + 26.0 + 12.0);
    }

    #[tokio::test]
    async fn test_ability_chance_and_extra_rows() {
        let stage = AbilityStage::new(resources(RendererConfig::default(), IconAtlas::new()));
        let slot = AbilitySlot {
            chance: Some("50%".into()),
            description: Some("first".into()),
            extra: Some(AbilityExtra {
                description: Some("then this".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut ctx = context(CardData::new("x").with_ability1(slot.clone()).with_ability2(slot));
        ctx.cursor.advance_to(700.0);

        let ctx = stage.process(ctx).await.unwrap();
        assert_eq!(ctx.summary.ability_blocks, 2);
        // per block: 12 + 26 + 26 + 26 + 12
        assert_eq!(ctx.cursor.y(), 700.0 + 2.0 * 102.0);
    }

    #[tokio::test]
    async fn test_cursor_advance_modes_differ_on_paragraphs() {
        let description = "one\ntwo\nthree";
        let card = CardData::new("x").with_ability1(AbilitySlot {
            description: Some(description.into()),
            ..Default::default()
        });

        let wrapped = AbilityStage::new(resources(RendererConfig::default(), IconAtlas::new()));
        let ctx = wrapped.process(context(card.clone())).await.unwrap();
        assert_eq!(ctx.cursor.y(), 26.0 + 3.0 * 26.0 + 12.0);

        let config = RendererConfig {
            cursor_advance: CursorAdvance::WidthEstimate,
            ..Default::default()
        };
        let estimated = AbilityStage::new(resources(config, IconAtlas::new()));
        let ctx = estimated.process(context(card)).await.unwrap();
        // the short unwrapped string estimates a single line
        assert_eq!(ctx.cursor.y(), 26.0 + 26.0 + 12.0);
    }

    #[tokio::test]
    async fn test_width_estimate_row_without_description_takes_a_line() {
        let config = RendererConfig {
            cursor_advance: CursorAdvance::WidthEstimate,
            ..Default::default()
        };
        let stage = AbilityStage::new(resources(config, IconAtlas::new()));
        let slot = AbilitySlot {
            mode: Some("attack".into()),
            cost: Some("3".into()),
            extra: Some(AbilityExtra {
                cost: Some("1".into()),
                description: Some("then this".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut ctx = context(CardData::new("x").with_ability1(slot));
        ctx.cursor.advance_to(700.0);

        let ctx = stage.process(ctx).await.unwrap();
        // lead line, cost-only row, extra row, block gap
        assert_eq!(ctx.cursor.y(), 700.0 + 26.0 + 26.0 + 26.0 + 12.0);
    }

    #[tokio::test]
    async fn test_optional_stages_skip_empty_content() {
        let res = resources(RendererConfig::default(), IconAtlas::new());
        let ctx = context(CardData::new("bare"));

        assert!(TagChipStage::new(res.clone()).can_skip(&ctx));
        assert!(AbilityStage::new(res.clone()).can_skip(&ctx));
        assert!(FooterStage::new(res.clone()).can_skip(&ctx));
        assert!(MetadataStage::new(res.clone()).can_skip(&ctx));
        assert!(!ArtworkStage::new(res).can_skip(&ctx));
    }

    #[tokio::test]
    async fn test_header_moves_cursor() {
        let stage = HeaderStage::new(resources(RendererConfig::default(), IconAtlas::new()));
        let ctx = stage.process(context(CardData::new("x"))).await.unwrap();
        assert_eq!(ctx.cursor.y(), 72.0);
        assert_eq!(ctx.canvas.get_pixel(10, 10), Some(Theme::default().accent.0));
        assert_eq!(ctx.canvas.get_pixel(10, 80).unwrap()[3], 0);
    }
}
