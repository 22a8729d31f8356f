pub mod config;
pub mod data;
pub mod index;
pub mod legend;
pub mod palette;
pub mod projection;
pub mod render;
pub mod server;
pub mod tooltip;
pub mod topology;
pub mod types;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the choropleth to map.svg and index.html
    Generate {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Output directory, overriding the config
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Render the choropleth in memory and serve it with lookup endpoints
    Serve {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config, out } => {
            let mut app_config = config::AppConfig::load(config.as_deref())?;
            if let Some(out) = out {
                app_config.output.dir = out.clone();
            }
            let scale = palette::ThresholdScale::from_config(&app_config.palette)
                .context("Invalid palette configuration")?;

            // 1. Load both datasets
            let inputs = data::load_inputs(&app_config.input).await?;

            // 2. Lay out and write the map
            let doc = render::MapDocument::build(&app_config, &scale, &inputs);
            let (svg, html) = doc.write_outputs(&app_config.output.dir)?;

            info!("Generation complete: {:?}, {:?}", svg, html);
        }
        Commands::Serve { config, port } => {
            let app_config = config::AppConfig::load(config.as_deref())?;
            let scale = palette::ThresholdScale::from_config(&app_config.palette)
                .context("Invalid palette configuration")?;

            let inputs = data::load_inputs(&app_config.input).await?;
            let state = server::AppState::new(&app_config, scale, inputs)?;

            server::start_server(port.unwrap_or(app_config.server.port), state).await?;
        }
    }

    Ok(())
}
