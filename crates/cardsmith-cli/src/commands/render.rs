//! Render command

use cardsmith_api::{ErrorBody, RenderService, ServiceConfig};
use cardsmith_raster::typeface::DEFAULT_FONT_PATH;
use cardsmith_raster::{CardRenderer, CursorAdvance, RendererConfig, register_fonts};
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Overrides taken from the command line
pub struct RenderOptions {
    pub config: Option<String>,
    pub icons: Option<String>,
    pub font: Option<String>,
    pub legacy_advance: bool,
}

/// Contents of a `--config` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub renderer: RendererConfig,
    pub service: ServiceConfig,
    pub font: Option<String>,
}

impl AppConfig {
    /// Load the config file, if any, and apply command-line overrides
    pub fn load(options: RenderOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match &options.config {
            Some(path) => serde_json::from_str::<AppConfig>(&fs::read_to_string(path)?)?,
            None => AppConfig::default(),
        };
        if let Some(icons) = options.icons {
            config.renderer.icon_dir = icons.into();
        }
        if options.legacy_advance {
            config.renderer.cursor_advance = CursorAdvance::WidthEstimate;
        }
        if options.font.is_some() {
            config.font = options.font;
        }
        Ok(config)
    }

    /// Register fonts and build the render service
    pub fn into_service(self) -> Result<RenderService, Box<dyn std::error::Error>> {
        let font = self.font.unwrap_or_else(|| DEFAULT_FONT_PATH.to_string());
        register_fonts(&font);

        let renderer = CardRenderer::from_config(self.renderer)?;
        Ok(RenderService::new(self.service, Arc::new(renderer)))
    }
}

pub async fn run(
    input: &str,
    output: &str,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = AppConfig::load(options)?.into_service()?;

    info!("Rendering card from {}", input);
    let body = fs::read(input)?;
    let response = service.handle(&body).await;

    if !response.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&response.body)
            .map(|e| match e.error {
                Some(detail) => format!("{}: {}", e.message, detail),
                None => e.message,
            })
            .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).into_owned());
        return Err(format!("render failed ({}): {}", response.status, message).into());
    }

    fs::write(output, &response.body)?;
    println!("Card written to {} ({} bytes)", output, response.body.len());

    Ok(())
}
