use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Context as _, Error};
use ledger::Ledger;
use log::{error, info};

use crate::Task;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub members: usize,
    pub awarded: usize,
    pub failed: usize,
}

/// Periodic safety net: re-reconciles every known member against all active
/// badges, catching triggers that were lost or failed.
#[derive(Clone)]
pub struct BadgeSweepBg {
    ledger: Arc<Ledger>,
}

#[async_trait]
impl Task for BadgeSweepBg {
    const NAME: &'static str = "badge_sweep";
    const CRON: &'static str = "0 0 */6 * * *";

    async fn process(&mut self) -> Result<(), Error> {
        let report = self.sweep().await?;
        info!(
            "Badge sweep done: members:{} awarded:{} failed:{}",
            report.members, report.awarded, report.failed
        );
        Ok(())
    }
}

impl BadgeSweepBg {
    pub fn new(ledger: Arc<Ledger>) -> BadgeSweepBg {
        BadgeSweepBg { ledger }
    }

    pub async fn sweep(&self) -> Result<SweepReport, Error> {
        let members = self.ledger.members().await.context("list members")?;
        let mut report = SweepReport::default();
        for member_id in members {
            report.members += 1;
            match self.ledger.reconcile(member_id).await {
                Ok(awarded) => report.awarded += awarded.len(),
                Err(err) => {
                    report.failed += 1;
                    error!("Failed to reconcile member {}: {:#}", member_id, err);
                }
            }
        }
        Ok(report)
    }
}
