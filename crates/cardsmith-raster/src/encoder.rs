//! PNG output

use cardsmith_core::{Canvas, CardError};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// Encoding errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Canvas buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

impl From<EncodeError> for CardError {
    fn from(e: EncodeError) -> Self {
        CardError::Encode(e.to_string())
    }
}

/// Serialize a finished canvas to PNG bytes
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, EncodeError> {
    let expected = canvas.width as usize * canvas.height as usize * 4;
    if canvas.data.len() != expected {
        return Err(EncodeError::BufferSize {
            expected,
            actual: canvas.data.len(),
        });
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &canvas.data,
        canvas.width,
        canvas.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}
