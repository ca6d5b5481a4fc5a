//! Card renderer
//!
//! Owns the stage pipeline and the shared resources it draws with. Each call
//! to [`CardRenderer::render`] gets its own canvas, cursor and theme.

use crate::assets::{AssetSource, IconDirectory};
use crate::config::RendererConfig;
use crate::encoder::encode_png;
use crate::stages::{
    AbilityStage, ArtworkStage, BackgroundStage, FooterStage, HeaderStage, MetadataStage,
    StageResources, TagChipStage, TitleStage,
};
use crate::theme::select_theme;
use crate::typeface::{self, Typeface};
use cardsmith_core::{Canvas, CardData, CardError, RenderSummary};
use cardsmith_pipeline::{CardContext, CardPipeline, RenderMetrics};
use std::sync::Arc;
use tracing::debug;

/// A finished render
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub canvas: Canvas,
    pub summary: RenderSummary,
    pub metrics: RenderMetrics,
}

impl RenderedCard {
    /// Encode the canvas as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, CardError> {
        Ok(encode_png(&self.canvas)?)
    }
}

/// Renders cards through the fixed stage sequence
pub struct CardRenderer {
    config: RendererConfig,
    pipeline: CardPipeline,
}

impl CardRenderer {
    /// Create a renderer with explicit typeface and icon source
    pub fn new(
        config: RendererConfig,
        face: Arc<Typeface>,
        assets: Arc<dyn AssetSource>,
    ) -> Result<Self, CardError> {
        let resources = Arc::new(StageResources::new(&config, face, assets));

        let pipeline = CardPipeline::builder()
            .stage(BackgroundStage)
            .stage(HeaderStage::new(resources.clone()))
            .stage(TitleStage::new(resources.clone()))
            .stage(MetadataStage::new(resources.clone()))
            .stage(ArtworkStage::new(resources.clone()))
            .stage(TagChipStage::new(resources.clone()))
            .stage(AbilityStage::new(resources.clone()))
            .stage(FooterStage::new(resources))
            .build()
            .map_err(|e| CardError::Render(e.to_string()))?;

        Ok(Self { config, pipeline })
    }

    /// Create a renderer using the registered typeface and the configured icon directory
    pub fn from_config(config: RendererConfig) -> Result<Self, CardError> {
        let assets = Arc::new(IconDirectory::new(config.icon_dir.clone()));
        Self::new(config, typeface::registered(), assets)
    }

    /// Stage names in draw order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }

    /// Render a card onto a fresh canvas
    ///
    /// Validation and the artwork size limit are checked before anything is
    /// drawn.
    pub async fn render(&self, card: CardData) -> Result<RenderedCard, CardError> {
        card.validate()?;
        if card.art.len() > self.config.max_art_bytes {
            return Err(CardError::PayloadTooLarge {
                size: card.art.len(),
                limit: self.config.max_art_bytes,
            });
        }

        let theme = select_theme(&card.category, &card.tags);
        debug!(category = %card.category, theme = ?theme, "Theme selected");

        let context = CardContext::new(card, theme, self.config.width, self.config.height);
        let context = self
            .pipeline
            .render(context)
            .await
            .map_err(|e| CardError::Render(e.to_string()))?;

        Ok(RenderedCard {
            canvas: context.canvas,
            summary: context.summary,
            metrics: context.metrics,
        })
    }

    /// Render a card and encode it as PNG
    pub async fn render_png(&self, card: CardData) -> Result<Vec<u8>, CardError> {
        self.render(card).await?.to_png()
    }
}
