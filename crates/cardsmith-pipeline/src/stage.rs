//! Draw stage abstraction
//!
//! Stages are the building blocks of a card render. Each stage takes the
//! render context, draws onto its canvas, moves its cursor, and hands it on.

use async_trait::async_trait;
use cardsmith_core::{Canvas, CardData, LayoutCursor, RenderSummary, Theme};

/// A single stage in the card pipeline
#[async_trait]
pub trait CardStage: Send + Sync {
    /// Draw this stage's content
    async fn process(&self, context: CardContext) -> Result<CardContext, StageError>;

    /// Stage name for logging and metrics
    fn name(&self) -> &'static str;

    /// Whether the stage has nothing to draw for this card
    fn can_skip(&self, _context: &CardContext) -> bool {
        false
    }
}

/// Stage processing error
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Context passed through the stages of one render
///
/// Owned by exactly one render call; never shared between renders.
pub struct CardContext {
    /// Card being drawn
    pub card: CardData,

    /// Palette selected once at the start of the render
    pub theme: Theme,

    /// Drawing surface
    pub canvas: Canvas,

    /// Running vertical offset
    pub cursor: LayoutCursor,

    /// What each stage produced
    pub summary: RenderSummary,

    /// Performance metrics
    pub metrics: RenderMetrics,
}

impl CardContext {
    /// Create a context with a fresh canvas
    pub fn new(card: CardData, theme: Theme, width: u32, height: u32) -> Self {
        Self {
            card,
            theme,
            canvas: Canvas::new(width, height),
            cursor: LayoutCursor::default(),
            summary: RenderSummary::default(),
            metrics: RenderMetrics::default(),
        }
    }

    /// Record stage timing
    pub fn record_stage(&mut self, stage_name: &'static str, duration_ms: f64, skipped: bool) {
        self.metrics.stages.push(StageTiming {
            name: stage_name,
            duration_ms,
            skipped,
        });
        self.metrics.total_time_ms += duration_ms;
    }
}

/// Timing of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub name: &'static str,
    pub duration_ms: f64,
    pub skipped: bool,
}

/// Render performance metrics
#[derive(Debug, Clone, Default)]
pub struct RenderMetrics {
    /// Stages in execution order
    pub stages: Vec<StageTiming>,
    /// Total render time
    pub total_time_ms: f64,
}

impl RenderMetrics {
    /// Names of the stages that actually drew, in order
    pub fn executed(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .filter(|s| !s.skipped)
            .map(|s| s.name)
            .collect()
    }

    /// Names of the stages that were skipped
    pub fn skipped(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .filter(|s| s.skipped)
            .map(|s| s.name)
            .collect()
    }
}
