use std::{collections::BTreeSet, time::Duration};

use eyre::Result;
use log::{error, info};
use model::{
    award::{BadgeProgress, EarnedBadge, NewlyAwarded},
    badge::{eval::Evaluation, Badge},
    ids::{BadgeId, MemberId},
    points::{PointEvent, PointSource},
};
use service::awards::Awards;
use service::catalog::{BadgeError, BadgeInput, Catalog};
use service::evaluator::Evaluator;
use service::points::{ActivityApproval, BonusGrant, EventAttendance, Points};
use service::reconciler::Reconciler;
use service::trigger::Trigger;
use storage::Storage;
use thiserror::Error;

pub mod service;


#[derive(Clone)]
pub struct Ledger {
    pub points: Points,
    pub catalog: Catalog,
    pub evaluator: Evaluator,
    pub reconciler: Reconciler,
    pub trigger: Trigger,
    pub awards: Awards,
}

impl Ledger {
    pub fn new(storage: Storage) -> Self {
        let points = Points::new(storage.points);
        let catalog = Catalog::new(storage.badges);
        let evaluator = Evaluator::new(points.clone());
        let reconciler = Reconciler::new(storage.awards.clone(), catalog.clone(), points.clone());
        let awards = Awards::new(storage.awards, catalog.clone(), points.clone());
        Ledger {
            points,
            catalog,
            evaluator,
            reconciler,
            trigger: Trigger::new(),
            awards,
        }
    }

    /// Starts the workers that drain the reconciliation queue.
    /// Must be called from within a tokio runtime.
    pub fn start_workers(&self, workers: usize, reconcile_timeout: Duration) -> bool {
        self.trigger
            .start(self.reconciler.clone(), workers, reconcile_timeout)
    }

    /// Every member with point events or awards.
    pub async fn members(&self) -> Result<Vec<MemberId>> {
        let mut members: BTreeSet<_> = self.points.members().await?.into_iter().collect();
        members.extend(self.awards.members().await?);
        Ok(members.into_iter().collect())
    }

    pub async fn record_activity_approval(
        &self,
        approval: ActivityApproval,
    ) -> Result<bool, RecordError> {
        check_points(approval.points)?;
        self.record(approval.into()).await
    }

    pub async fn record_bonus_points(&self, grant: BonusGrant) -> Result<bool, RecordError> {
        check_points(grant.points)?;
        self.record(grant.into()).await
    }

    pub async fn record_event_points(
        &self,
        attendance: EventAttendance,
    ) -> Result<bool, RecordError> {
        check_points(attendance.points)?;
        self.record(attendance.into()).await
    }

    async fn record(&self, event: PointEvent) -> Result<bool, RecordError> {
        let member_id = event.member_id;
        info!(
            "Recording {} points for member {} from {}:{}",
            event.points, member_id, event.source, event.source_ref_id
        );
        let inserted = self.points.record(event).await?;
        self.trigger.on_ledger_mutation(member_id);
        Ok(inserted)
    }

    /// Earned badges stay earned even if the supporting points disappear.
    pub async fn delete_point_event(
        &self,
        source: PointSource,
        source_ref_id: i64,
    ) -> Result<Vec<MemberId>> {
        let members = self.points.delete(source, source_ref_id).await?;
        for member_id in &members {
            self.trigger.on_ledger_mutation(*member_id);
        }
        Ok(members)
    }

    /// Validates and stores the badge, then queues every known member: a
    /// criteria change can make anyone newly eligible.
    pub async fn upsert_criteria_definition(&self, input: BadgeInput) -> Result<Badge, BadgeError> {
        let badge = self.catalog.upsert(input).await?;
        self.queue_all_after_edit(badge.id).await;
        Ok(badge)
    }

    pub async fn set_badge_active(
        &self,
        id: BadgeId,
        is_active: bool,
    ) -> Result<Badge, BadgeError> {
        let badge = self.catalog.set_active(id, is_active).await?;
        if is_active {
            self.queue_all_after_edit(badge.id).await;
        }
        Ok(badge)
    }

    pub async fn on_all_members(&self) -> Result<usize> {
        let members = self.members().await?;
        for member_id in &members {
            self.trigger.on_ledger_mutation(*member_id);
        }
        Ok(members.len())
    }

    /// The edit is already stored; the sweep picks up members missed here.
    async fn queue_all_after_edit(&self, badge_id: BadgeId) {
        if let Err(err) = self.on_all_members().await {
            error!("Failed to queue members after editing badge {}: {:#}", badge_id, err);
        }
    }

    pub async fn evaluate(
        &self,
        member_id: MemberId,
        badge_id: BadgeId,
    ) -> Result<Evaluation, BadgeError> {
        let definition = self.catalog.get_criteria(badge_id).await?;
        Ok(self.evaluator.evaluate(member_id, &definition).await?)
    }

    pub async fn reconcile(&self, member_id: MemberId) -> Result<Vec<NewlyAwarded>> {
        self.reconciler.reconcile(member_id).await
    }

    pub async fn earned_badges(&self, member_id: MemberId) -> Result<Vec<EarnedBadge>> {
        self.awards.earned_badges(member_id).await
    }

    pub async fn badge_progress(&self, member_id: MemberId) -> Result<Vec<BadgeProgress>> {
        self.awards.badge_progress(member_id).await
    }

    pub fn newly_awarded(&self, member_id: MemberId) -> Vec<NewlyAwarded> {
        self.reconciler.newly_awarded(member_id)
    }
}

fn check_points(points: i64) -> Result<(), RecordError> {
    if points < 0 {
        return Err(RecordError::NegativePoints(points));
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Negative points: {0}")]
    NegativePoints(i64),
    #[error("Common error: {0:#}")]
    Common(#[from] eyre::Error),
}
