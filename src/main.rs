//! Label Lens - food label scanner
//!
//! Capture or upload a photo of a food label, submit it to the analysis
//! service for OCR and ingredient risk classification, and review the
//! structured results with a bounded recent-scan history.

mod acquire;
mod api;
mod config;
mod dashboard;
mod scan;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Label Lens - scan food labels for ingredient risks
#[derive(Parser, Debug)]
#[command(name = "label-lens")]
#[command(about = "Scan food labels and review ingredient risk analysis")]
struct Args {
    /// Analysis backend base URL (overrides config file and environment)
    #[arg(long)]
    backend_url: Option<String>,

    /// Capture device index to use for the camera
    #[arg(long)]
    camera_index: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first; precedence is CLI > environment > file.
    let mut config = config::load_or_default();
    if let Some(url) = args.backend_url {
        config.backend.base_url = url;
    }
    if let Some(index) = args.camera_index {
        config.camera.device_index = index;
    }

    let level = if args.verbose || config.general.verbose_logging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Label Lens starting...");
    info!("Analysis backend: {}", config.backend.base_url);

    dashboard::run_dashboard(config)?;

    info!("Label Lens shutdown complete");

    Ok(())
}
