use std::{collections::HashSet, sync::Arc, time::Duration};

use log::{error, info, warn};
use model::ids::MemberId;
use parking_lot::Mutex;
use tokio::{
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        Mutex as AsyncMutex,
    },
    time::timeout,
};

use super::reconciler::Reconciler;

/// Queue of members whose badges need another look. Enqueueing never blocks;
/// a member already waiting in the queue is not queued twice.
#[derive(Clone)]
pub struct Trigger {
    tx: UnboundedSender<MemberId>,
    rx: Arc<Mutex<Option<UnboundedReceiver<MemberId>>>>,
    pending: Arc<Mutex<HashSet<MemberId>>>,
}

impl Trigger {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Trigger {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
            pending: Default::default(),
        }
    }

    pub fn on_ledger_mutation(&self, member_id: MemberId) {
        if !self.pending.lock().insert(member_id) {
            return;
        }
        if self.tx.send(member_id).is_err() {
            self.pending.lock().remove(&member_id);
            warn!("Reconciliation queue is closed, member {} skipped", member_id);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Spawns the workers draining the queue. Only the first call has an
    /// effect; returns whether workers were started.
    pub(crate) fn start(&self, reconciler: Reconciler, workers: usize, limit: Duration) -> bool {
        let Some(rx) = self.rx.lock().take() else {
            warn!("Reconciliation workers are already running");
            return false;
        };
        let rx = Arc::new(AsyncMutex::new(rx));
        let workers = workers.max(1);
        info!("Starting {} reconciliation workers", workers);
        for worker in 0..workers {
            let rx = rx.clone();
            let pending = self.pending.clone();
            let reconciler = reconciler.clone();
            tokio::spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(member_id) = next else {
                        break;
                    };
                    // Mutations arriving from now on need a fresh pass.
                    pending.lock().remove(&member_id);
                    let reconciler = reconciler.clone();
                    let job = tokio::spawn(async move {
                        timeout(limit, reconciler.reconcile(member_id)).await
                    });
                    match job.await {
                        Ok(Ok(Ok(awarded))) => {
                            if !awarded.is_empty() {
                                info!(
                                    "Worker {}: member {} earned {} badge(s)",
                                    worker,
                                    member_id,
                                    awarded.len()
                                );
                            }
                        }
                        Ok(Ok(Err(err))) => {
                            error!("Failed to reconcile member {}: {:#}", member_id, err);
                        }
                        Ok(Err(_)) => {
                            warn!("Reconciliation of member {} timed out", member_id);
                        }
                        Err(err) => {
                            error!("Reconciliation of member {} aborted: {}", member_id, err);
                        }
                    }
                }
                info!("Reconciliation worker {} stopped", worker);
            });
        }
        true
    }
}
