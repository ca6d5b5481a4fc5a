//! Cardsmith Core - card data model and drawing-surface types
//!
//! Cardsmith turns a normalized collectible-card description into a fixed-size
//! raster image. This crate holds the types every other layer shares:
//!
//! ```text
//! CardData ──► Theme ──► [draw stages over Canvas + LayoutCursor] ──► PNG bytes
//! ```
//!
//! Nothing here outlives a single render: the card record, its palette, the
//! canvas and the cursor are all created at the start of a render and dropped
//! at the end.

pub mod canvas;
pub mod card;
pub mod error;
pub mod layout;
pub mod style;

// Re-export commonly used types
pub use canvas::Canvas;
pub use card::{AbilityExtra, AbilitySlot, CardData, FOOTER_SEPARATOR};
pub use error::{CardError, Result};
pub use layout::{ArtworkOutcome, LayoutCursor, PlaceholderKind, Rect, RenderSummary, RoundedRect};
pub use style::{Color, Theme};
