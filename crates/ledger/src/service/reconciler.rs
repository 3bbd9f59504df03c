use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use eyre::{Context as _, Result};
use log::{debug, info};
use model::{
    award::{Award, NewlyAwarded},
    ids::MemberId,
};
use parking_lot::RwLock;
use storage::repo::AwardRepo;

use super::{
    catalog::Catalog,
    evaluator::{evaluate_definition, today},
    points::Points,
};

/// Turns eligibility into durable awards. Safe to run any number of times,
/// concurrently, for the same member: the award store's uniqueness on
/// `(member_id, badge_id)` decides which call persists a badge.
#[derive(Clone)]
pub struct Reconciler {
    awards: Arc<dyn AwardRepo>,
    catalog: Catalog,
    points: Points,
    last: Arc<RwLock<HashMap<MemberId, Vec<NewlyAwarded>>>>,
}

impl Reconciler {
    pub(crate) fn new(awards: Arc<dyn AwardRepo>, catalog: Catalog, points: Points) -> Self {
        Reconciler {
            awards,
            catalog,
            points,
            last: Default::default(),
        }
    }

    /// Returns the badges this call persisted. On a storage failure the
    /// badges persisted before it are still recorded for `newly_awarded`.
    pub async fn reconcile(&self, member_id: MemberId) -> Result<Vec<NewlyAwarded>> {
        let earned: HashSet<_> = self
            .awards
            .member_awards(member_id)
            .await
            .with_context(|| format!("load awards of member {}", member_id))?
            .into_iter()
            .map(|award| award.badge_id)
            .collect();
        let pending: Vec<_> = self
            .catalog
            .list_active_criteria()
            .await
            .context("load active badges")?
            .into_iter()
            .filter(|definition| !earned.contains(&definition.badge_id))
            .collect();

        let mut newly_awarded = Vec::new();
        if !pending.is_empty() {
            let snapshot = self.points.snapshot(member_id).await?;
            let today = today();
            for definition in pending {
                let evaluation = evaluate_definition(&definition, &snapshot, today);
                if !evaluation.eligible {
                    continue;
                }

                let award = Award::new(member_id, definition.badge_id, Utc::now());
                let awarded_at = award.awarded_at;
                let inserted = match self.awards.insert_if_absent(award).await {
                    Ok(inserted) => inserted,
                    Err(err) => {
                        self.last.write().insert(member_id, newly_awarded);
                        return Err(err.wrap_err(format!(
                            "award badge {} to member {}",
                            definition.badge_id, member_id
                        )));
                    }
                };
                if inserted {
                    info!(
                        "Member {} earned badge {} ({})",
                        member_id, definition.badge_id, definition.name
                    );
                    newly_awarded.push(NewlyAwarded {
                        badge_id: definition.badge_id,
                        name: definition.name,
                        awarded_at,
                    });
                } else {
                    debug!(
                        "Badge {} already awarded to member {}",
                        definition.badge_id, member_id
                    );
                }
            }
        }

        self.last.write().insert(member_id, newly_awarded.clone());
        Ok(newly_awarded)
    }

    /// Result of the most recent `reconcile` for the member in this process.
    pub fn newly_awarded(&self, member_id: MemberId) -> Vec<NewlyAwarded> {
        self.last
            .read()
            .get(&member_id)
            .cloned()
            .unwrap_or_default()
    }
}
