//! Cardsmith CLI
//!
//! Renders card payloads to PNG files, serves them over HTTP and inspects
//! theme selection.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

/// Cardsmith - collectible card renderer
#[derive(Parser)]
#[command(name = "cardsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a card payload (JSON) to a PNG file
    Render {
        /// Input payload file
        input: String,

        /// Output file
        #[arg(short, long, default_value = "card.png")]
        output: String,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Icon directory
        #[arg(long)]
        icons: Option<String>,

        /// Font file
        #[arg(long)]
        font: Option<String>,

        /// Advance the cursor by the unwrapped-width estimate
        #[arg(long)]
        legacy_advance: bool,
    },

    /// Serve `POST /render` and `GET /health` over HTTP
    Serve {
        /// Listen address (defaults to the configured one, 127.0.0.1:3001)
        #[arg(short, long)]
        address: Option<String>,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Icon directory
        #[arg(long)]
        icons: Option<String>,

        /// Font file
        #[arg(long)]
        font: Option<String>,

        /// Advance the cursor by the unwrapped-width estimate
        #[arg(long)]
        legacy_advance: bool,
    },

    /// Print the palette selected for a category and tags
    Theme {
        /// Category label
        category: String,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(log_level.into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            icons,
            font,
            legacy_advance,
        } => {
            let options = commands::render::RenderOptions {
                config,
                icons,
                font,
                legacy_advance,
            };
            commands::render::run(&input, &output, options).await?;
        }

        Commands::Serve {
            address,
            config,
            icons,
            font,
            legacy_advance,
        } => {
            let options = commands::render::RenderOptions {
                config,
                icons,
                font,
                legacy_advance,
            };
            commands::serve::run(address, options).await?;
        }

        Commands::Theme { category, tags } => {
            commands::theme::run(&category, &tags)?;
        }
    }

    Ok(())
}
