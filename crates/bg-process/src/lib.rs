use std::sync::Arc;

use async_trait::async_trait;
use eyre::Error;
use ledger::Ledger;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};

pub mod process;

use process::sweep::BadgeSweepBg;

#[async_trait]
pub trait Task {
    const NAME: &'static str;
    const CRON: &'static str;

    async fn process(&mut self) -> Result<(), Error>;
}

/// Schedules the background tasks and returns the running scheduler.
pub async fn start(ledger: Arc<Ledger>, sweep_on_start: bool) -> Result<JobScheduler, Error> {
    let scheduler = JobScheduler::new().await?;
    let sweep = BadgeSweepBg::new(ledger);
    if sweep_on_start {
        let mut sweep = sweep.clone();
        tokio::spawn(async move {
            if let Err(err) = sweep.process().await {
                error!("Initial badge sweep failed: {:#}", err);
            }
        });
    }
    register(&scheduler, sweep).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register<T>(scheduler: &JobScheduler, task: T) -> Result<(), Error>
where
    T: Task + Clone + Send + Sync + 'static,
{
    let job = Job::new_async(T::CRON, move |_, _| {
        let mut task = task.clone();
        Box::pin(async move {
            info!("Running task {}", T::NAME);
            if let Err(err) = task.process().await {
                error!("Task {} failed: {:#}", T::NAME, err);
            }
        })
    })?;
    scheduler.add(job).await?;
    info!("Scheduled task {} ({})", T::NAME, T::CRON);
    Ok(())
}
