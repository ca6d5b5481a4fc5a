//! Cardsmith Raster Engine
//!
//! Composes cards onto an RGBA canvas: theme selection, greedy text
//! wrapping, image fitting, the draw stages and PNG output.

pub mod assets;
pub mod compositor;
pub mod config;
pub mod encoder;
pub mod renderer;
pub mod stages;
pub mod text;
pub mod theme;
pub mod typeface;

pub use assets::{AssetError, AssetSource, IconAtlas, IconDirectory, decode_artwork};
pub use compositor::{composite_artwork, fit_and_center};
pub use config::{CardLayout, CursorAdvance, RendererConfig, TitleCentering};
pub use encoder::{EncodeError, encode_png};
pub use renderer::{CardRenderer, RenderedCard};
pub use text::{TextBlock, draw_wrapped, wrap_lines};
pub use theme::select_theme;
pub use typeface::{FontError, TextStyle, Typeface, register_fonts};
