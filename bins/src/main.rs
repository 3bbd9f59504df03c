use std::sync::Arc;

use eyre::Context;
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let env = env::Env::load()?;
    pretty_env_logger::init();
    color_eyre::install()?;

    info!("connecting to mongo");
    let storage = storage::Storage::new(env.mongo_url())
        .await
        .context("Failed to create storage")?;
    info!("creating ledger");
    let ledger = Arc::new(ledger::Ledger::new(storage));
    ledger.start_workers(env.trigger_workers(), env.reconcile_timeout());

    info!("Starting background tasks...");
    let mut scheduler = bg_process::start(ledger.clone(), env.sweep_on_start()).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");
    scheduler.shutdown().await?;
    Ok(())
}
