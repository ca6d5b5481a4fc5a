//! Error types for card rendering

use thiserror::Error;

/// Card rendering errors
///
/// Asset decode failures are not listed here: they degrade only their own
/// region of the card and never abort a render.
#[derive(Debug, Error)]
pub enum CardError {
    /// A required field is absent; raised before any drawing
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Artwork or request body exceeds the admission limit
    #[error("Payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// A draw stage failed
    #[error("Render failed: {0}")]
    Render(String),

    /// The finished surface could not be serialized
    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl CardError {
    /// Whether the caller sent something unacceptable (as opposed to an internal failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::PayloadTooLarge { .. })
    }
}

/// Result type for card operations
pub type Result<T> = std::result::Result<T, CardError>;
