//! Cardsmith Pipeline - ordered draw stages over one canvas and one cursor
//!
//! # Pipeline Architecture
//!
//! ```text
//! CardContext → [background] → [header] → [title] → ... → [footer] → CardContext
//!                    │             │          │                │
//!                    └──────── shared Canvas + LayoutCursor ───┘
//! ```
//!
//! Each stage receives the context produced by the previous one. Stages whose
//! source data is empty report `can_skip` and are recorded as skipped.

pub mod pipeline;
pub mod stage;

// Re-export commonly used types
pub use pipeline::{CardPipeline, PipelineBuilder, PipelineError};
pub use stage::{CardContext, CardStage, RenderMetrics, StageError, StageTiming};
