//! Image asset sources
//!
//! Icons are looked up by string key (a tag or an ability mode) and artwork
//! arrives inline as a data URI. Decoding is awaited one image at a time and
//! nothing decoded is kept beyond the render that asked for it.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Asset errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset key: {0}")]
    InvalidKey(String),

    #[error("Unsupported artwork URI")]
    UnsupportedUri,

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of icon images keyed by name
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Load and decode the icon for `key`
    async fn load_icon(&self, key: &str) -> Result<RgbaImage, AssetError>;
}

/// Icons stored as `<root>/<key>.png`
#[derive(Debug, Clone)]
pub struct IconDirectory {
    root: PathBuf,
}

impl IconDirectory {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File path for a key, rejecting keys that would leave the directory
    pub fn icon_path(&self, key: &str) -> Result<PathBuf, AssetError> {
        let valid = !key.is_empty()
            && !key.contains(['/', '\\', '\0'])
            && Path::new(key)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(AssetError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.png")))
    }
}

#[async_trait]
impl AssetSource for IconDirectory {
    async fn load_icon(&self, key: &str) -> Result<RgbaImage, AssetError> {
        let path = self.icon_path(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        decode_blocking(bytes).await
    }
}

/// In-memory icons keyed by name
#[derive(Debug, Clone, Default)]
pub struct IconAtlas {
    icons: HashMap<String, RgbaImage>,
}

impl IconAtlas {
    /// Create an empty atlas
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an icon
    pub fn insert(&mut self, key: impl Into<String>, icon: RgbaImage) {
        self.icons.insert(key.into(), icon);
    }

    /// Add an icon (builder form)
    pub fn with_icon(mut self, key: impl Into<String>, icon: RgbaImage) -> Self {
        self.insert(key, icon);
        self
    }

    /// Number of icons
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Whether the atlas holds no icons
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

#[async_trait]
impl AssetSource for IconAtlas {
    async fn load_icon(&self, key: &str) -> Result<RgbaImage, AssetError> {
        self.icons
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }
}

/// Whether the artwork string is something the decoder will attempt
pub fn is_image_data_uri(uri: &str) -> bool {
    uri.starts_with("data:image/")
}

/// Decode a `data:image/...;base64,...` URI
pub async fn decode_artwork(uri: &str) -> Result<RgbaImage, AssetError> {
    if !is_image_data_uri(uri) {
        return Err(AssetError::UnsupportedUri);
    }
    let (header, payload) = uri.split_once(',').ok_or(AssetError::UnsupportedUri)?;
    if !header.ends_with(";base64") {
        return Err(AssetError::UnsupportedUri);
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::Decode(e.to_string()))?;
    decode_blocking(bytes).await
}

/// Decode encoded image bytes off the async executor
async fn decode_blocking(bytes: Vec<u8>) -> Result<RgbaImage, AssetError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|img| img.to_rgba8()))
        .await
        .map_err(|e| AssetError::Decode(e.to_string()))?
        .map_err(|e| AssetError::Decode(e.to_string()))
}

/// Encode an image as a PNG data URI
pub fn png_data_uri(image: &RgbaImage) -> Result<String, AssetError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| AssetError::Decode(e.to_string()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
    }

    #[test]
    fn test_icon_path_rejects_escapes() {
        let dir = IconDirectory::new("/icons");
        assert_eq!(
            dir.icon_path("fire").unwrap(),
            PathBuf::from("/icons/fire.png")
        );
        assert!(dir.icon_path("忍术").is_ok());
        assert!(dir.icon_path("a..b").is_ok());
        assert!(dir.icon_path("v1.2").is_ok());
        for bad in ["", ".", "..", "../etc/passwd", "a/b", "a\\b"] {
            assert!(matches!(dir.icon_path(bad), Err(AssetError::InvalidKey(_))));
        }
    }

    #[tokio::test]
    async fn test_icon_directory_loads_png() {
        let tmp = tempfile::tempdir().unwrap();
        solid(8, 8).save(tmp.path().join("fire.png")).unwrap();

        let dir = IconDirectory::new(tmp.path());
        let icon = dir.load_icon("fire").await.unwrap();
        assert_eq!(icon.dimensions(), (8, 8));

        assert!(matches!(
            dir.load_icon("water").await,
            Err(AssetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_icon_is_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("broken.png"), b"not a png").unwrap();

        let dir = IconDirectory::new(tmp.path());
        assert!(matches!(
            dir.load_icon("broken").await,
            Err(AssetError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_icon_atlas() {
        let atlas = IconAtlas::new().with_icon("attack", solid(4, 4));
        assert_eq!(atlas.len(), 1);
        assert!(atlas.load_icon("attack").await.is_ok());
        assert!(atlas.load_icon("defend").await.is_err());
    }

    #[tokio::test]
    async fn test_artwork_data_uri_round_trip() {
        let uri = png_data_uri(&solid(3, 6)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = decode_artwork(&uri).await.unwrap();
        assert_eq!(decoded.dimensions(), (3, 6));
    }

    #[tokio::test]
    async fn test_artwork_rejections() {
        assert!(matches!(
            decode_artwork("https://example.com/a.png").await,
            Err(AssetError::UnsupportedUri)
        ));
        assert!(matches!(
            decode_artwork("data:image/png,rawbytes").await,
            Err(AssetError::UnsupportedUri)
        ));
        assert!(matches!(
            decode_artwork("data:image/png;base64,@@@@").await,
            Err(AssetError::Decode(_))
        ));
        assert!(matches!(
            decode_artwork("data:image/png;base64,aGVsbG8=").await,
            Err(AssetError::Decode(_))
        ));
    }
}
