use std::{collections::HashMap, sync::Arc};

use eyre::Result;
use model::{
    award::{BadgeProgress, EarnedBadge},
    badge::CriteriaDefinition,
    ids::MemberId,
};
use storage::repo::AwardRepo;

use super::{
    catalog::Catalog,
    evaluator::{evaluate_definition, today},
    points::Points,
};

/// Read side for dashboards and badge lists.
#[derive(Clone)]
pub struct Awards {
    repo: Arc<dyn AwardRepo>,
    catalog: Catalog,
    points: Points,
}

impl Awards {
    pub(crate) fn new(repo: Arc<dyn AwardRepo>, catalog: Catalog, points: Points) -> Self {
        Awards {
            repo,
            catalog,
            points,
        }
    }

    pub async fn members(&self) -> Result<Vec<MemberId>> {
        self.repo.members().await
    }

    /// Newest first. Awards outlive their badge row; those keep an empty name.
    pub async fn earned_badges(&self, member_id: MemberId) -> Result<Vec<EarnedBadge>> {
        let awards = self.repo.member_awards(member_id).await?;
        let badges: HashMap<_, _> = self
            .catalog
            .list_badges()
            .await?
            .into_iter()
            .map(|badge| (badge.id, badge))
            .collect();

        Ok(awards
            .into_iter()
            .map(|award| {
                let badge = badges.get(&award.badge_id);
                EarnedBadge {
                    badge_id: award.badge_id,
                    name: badge.map(|b| b.name.clone()).unwrap_or_default(),
                    description: badge.map(|b| b.description.clone()).unwrap_or_default(),
                    icon: badge.and_then(|b| b.icon.clone()),
                    awarded_at: award.awarded_at,
                }
            })
            .collect())
    }

    /// Progress for every active badge. Hidden badges show up only once earned.
    pub async fn badge_progress(&self, member_id: MemberId) -> Result<Vec<BadgeProgress>> {
        let earned: Vec<_> = self
            .repo
            .member_awards(member_id)
            .await?
            .into_iter()
            .map(|award| award.badge_id)
            .collect();
        let definitions = self.catalog.list_active_criteria().await?;
        let snapshot = self.points.snapshot(member_id).await?;
        let today = today();

        Ok(definitions
            .iter()
            .filter_map(|definition: &CriteriaDefinition| {
                let is_earned = earned.contains(&definition.badge_id);
                if definition.is_hidden && !is_earned {
                    return None;
                }
                let evaluation = evaluate_definition(definition, &snapshot, today);
                Some(BadgeProgress {
                    badge_id: definition.badge_id,
                    name: definition.name.clone(),
                    eligible: evaluation.eligible,
                    progress: evaluation.progress,
                    earned: is_earned,
                })
            })
            .collect())
    }
}
