use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use latchview_core::StreamClient;

mod config;
mod render;

use config::Config;
use render::Renderer;

#[derive(Parser)]
#[command(name = "latchview")]
#[command(author, version, about = "Console dashboard for latchview smart-lock monitors", long_about = None)]
struct Cli {
    /// Base URL of the lock monitor (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let url = config::resolve_url(cli.url.clone(), &config);
    let renderer = Renderer::new(!(cli.no_color || config.no_color));

    let client = StreamClient::for_server(&url, config.stream_options())?;
    let mut updates = client.subscribe();
    client.start().await?;

    if !cli.quiet {
        println!("watching {url} (press ctrl-c to quit)");
        println!("waiting for event history...");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            update = updates.recv() => match update {
                Ok(update) => renderer.print_update(&update),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "display fell behind the update stream");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.stop().await;
    Ok(())
}
