//! Detection API server.
//!
//! Loads the artifact set, fails fast if any required artifact is missing,
//! and serves the detection endpoints.

use anyhow::Context;
use clap::Parser;
use leafscan::core::config::DetectorConfig;
use leafscan::pipeline::DiseaseDetector;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "leafscan-server", about = "Plant disease detection API server")]
struct Args {
    /// Directory containing the model artifacts and JSON tables.
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Optional JSON config file; overrides --model-dir when given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leafscan::utils::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DetectorConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DetectorConfig::new(&args.model_dir),
    };

    // A missing artifact aborts startup here, so the service never
    // reports healthy without a complete artifact set.
    let detector = DiseaseDetector::from_config(&config)
        .context("failed to load detection artifacts")?;
    info!(classes = detector.num_classes(), "artifacts loaded");

    leafscan::server::serve(args.listen, Arc::new(detector))
        .await
        .context("server error")?;
    Ok(())
}
