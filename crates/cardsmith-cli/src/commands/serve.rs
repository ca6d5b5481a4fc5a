//! Serve command

use super::render::{AppConfig, RenderOptions};
use cardsmith_api::HttpServer;
use std::sync::Arc;
use tracing::info;

pub async fn run(
    address: Option<String>,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(options)?;
    if let Some(address) = address {
        config.service.listen_address = address;
    }
    let address = config.service.listen_address.clone();

    info!("Starting cardsmith server on {}", address);
    let service = Arc::new(config.into_service()?);
    let server = HttpServer::bind(&address, service).await?;

    println!("Cardsmith Render Server");
    println!("=======================");
    println!();
    println!("Listening on: http://{}", server.local_addr()?);
    println!("Routes:       POST /render, GET /health");
    println!();
    println!("Press Ctrl+C to stop");

    server.run().await?;
    Ok(())
}
