//! Card pipeline orchestration

use crate::stage::{CardContext, CardStage};
use std::time::Instant;
use thiserror::Error;
use tracing::{Instrument, Level, debug, span};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No stages in pipeline")]
    NoStages,

    #[error("Stage '{0}' failed: {1}")]
    StageError(String, String),
}

/// An ordered sequence of draw stages
///
/// Stages run strictly one after another in insertion order. The pipeline
/// holds no per-render state, so one instance serves concurrent renders.
pub struct CardPipeline {
    stages: Vec<Box<dyn CardStage>>,
}

impl CardPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run every stage over the context
    pub async fn render(&self, context: CardContext) -> Result<CardContext, PipelineError> {
        let span = span!(Level::DEBUG, "render_card", name = %context.card.name);
        self.run_stages(context).instrument(span).await
    }

    async fn run_stages(&self, mut context: CardContext) -> Result<CardContext, PipelineError> {
        let start = Instant::now();

        for stage in &self.stages {
            let stage_name = stage.name();

            if stage.can_skip(&context) {
                debug!(stage = stage_name, "Skipping stage");
                context.record_stage(stage_name, 0.0, true);
                continue;
            }

            let stage_start = Instant::now();
            let cursor_before = context.cursor.y();

            context = stage
                .process(context)
                .await
                .map_err(|e| PipelineError::StageError(stage_name.to_string(), e.to_string()))?;

            let stage_duration = stage_start.elapsed().as_secs_f64() * 1000.0;
            context.record_stage(stage_name, stage_duration, false);

            debug!(
                stage = stage_name,
                duration_ms = stage_duration,
                cursor_from = cursor_before,
                cursor_to = context.cursor.y(),
                "Stage completed"
            );
        }

        context.summary.final_cursor = context.cursor.y();

        debug!(
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            cursor = context.summary.final_cursor,
            "Pipeline completed"
        );

        Ok(context)
    }

    /// Get stage names, in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

/// Pipeline builder
pub struct PipelineBuilder {
    stages: Vec<Box<dyn CardStage>>,
}

impl PipelineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage
    pub fn stage(mut self, stage: impl CardStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<CardPipeline, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages);
        }
        Ok(CardPipeline {
            stages: self.stages,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
