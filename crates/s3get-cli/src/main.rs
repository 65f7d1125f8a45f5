use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use s3get_core::blob_store::{BlobStore, S3BlobStore};
use s3get_core::storage::Destination;
use s3get_core::{config, logging, supervisor};

/// Download a single S3 object with many concurrent ranged GETs.
#[derive(Debug, Parser)]
#[command(name = "s3get")]
#[command(about = "Parallel-fetch an S3 object to a file or stdout", long_about = None)]
struct Cli {
    /// Source object, as `s3://bucket/key`.
    source: String,

    /// Destination path, or `-` for standard output.
    #[arg(default_value = "-")]
    destination: String,

    /// Max concurrent ranged GETs (overrides config).
    #[arg(long)]
    max_concurrent_requests: Option<usize>,

    /// Max bytes per segment (overrides config).
    #[arg(long)]
    max_segment_size: Option<u64>,

    /// Max buffered segments awaiting their turn to write (overrides config).
    #[arg(long)]
    max_pending_appends: Option<usize>,

    /// Watchdog inactivity deadline in seconds (overrides config).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    if let Err(err) = run().await {
        eprintln!("s3get error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load().context("failed to load configuration")?;
    if let Some(v) = cli.max_concurrent_requests {
        cfg.max_concurrent_requests = v;
    }
    if let Some(v) = cli.max_segment_size {
        cfg.max_segment_size = v;
    }
    if let Some(v) = cli.max_pending_appends {
        cfg.max_pending_appends = v;
    }
    if let Some(v) = cli.timeout_secs {
        cfg.timeout_secs = v;
    }
    cfg.validate().context("invalid configuration")?;
    tracing::debug!(?cfg, "resolved configuration");

    let blob_store: Arc<dyn BlobStore> = Arc::new(S3BlobStore::from_env().await);
    let destination = Destination::parse(&cli.destination);

    supervisor::run(blob_store, &cli.source, destination, &cfg)
        .await
        .context("transfer failed")?;

    Ok(())
}
