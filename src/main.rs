use std::sync::Arc;
use tracing::{error, info};

use region_latency_analytics::{
    api,
    config::Config,
    dataset::Dataset,
    logging,
    metrics,
    Result,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("region_latency_analytics failed to start: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::load()?;

    // Initialize logging
    logging::init_logger(&config.logging)?;

    // Initialize metrics
    metrics::init_metrics();

    // Dataset must be in memory before the listener opens
    let dataset = Dataset::load(&config.dataset.path)?;
    metrics::set_dataset_records(dataset.len());
    info!("Serving {} regions", dataset.regions().len());

    api::start_server(&config, Arc::new(dataset)).await
}
