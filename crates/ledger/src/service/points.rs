use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use eyre::{Context as _, Result};
use model::{
    ids::{ActivityId, MemberId},
    points::{Category, PointEvent, PointSource, Totals},
    snapshot::LedgerSnapshot,
};
use storage::repo::PointsRepo;

/// An administrator approved a member's activity request.
#[derive(Debug, Clone)]
pub struct ActivityApproval {
    pub member_id: MemberId,
    pub request_id: i64,
    pub activity_id: ActivityId,
    pub points: i64,
    pub category: Category,
    pub occurred_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct BonusGrant {
    pub member_id: MemberId,
    pub bonus_id: i64,
    pub points: i64,
    pub category: Option<Category>,
    pub occurred_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct EventAttendance {
    pub member_id: MemberId,
    pub event_id: i64,
    pub activity_id: Option<ActivityId>,
    pub points: i64,
    pub category: Option<Category>,
    pub occurred_at: NaiveDate,
}

impl From<ActivityApproval> for PointEvent {
    fn from(approval: ActivityApproval) -> Self {
        PointEvent::activity(
            approval.member_id,
            approval.request_id,
            approval.activity_id,
            approval.points,
            approval.category,
            approval.occurred_at,
        )
    }
}

impl From<BonusGrant> for PointEvent {
    fn from(grant: BonusGrant) -> Self {
        PointEvent::bonus(
            grant.member_id,
            grant.bonus_id,
            grant.points,
            grant.category,
            grant.occurred_at,
        )
    }
}

impl From<EventAttendance> for PointEvent {
    fn from(attendance: EventAttendance) -> Self {
        PointEvent::event(
            attendance.member_id,
            attendance.event_id,
            attendance.activity_id,
            attendance.points,
            attendance.category,
            attendance.occurred_at,
        )
    }
}

/// Read view over all point sources of a member.
#[derive(Clone)]
pub struct Points {
    repo: Arc<dyn PointsRepo>,
}

impl Points {
    pub(crate) fn new(repo: Arc<dyn PointsRepo>) -> Self {
        Points { repo }
    }

    pub async fn snapshot(&self, member_id: MemberId) -> Result<LedgerSnapshot> {
        let events = self
            .repo
            .member_events(member_id)
            .await
            .with_context(|| format!("load point events of member {}", member_id))?;
        Ok(LedgerSnapshot::new(member_id, events))
    }

    pub async fn totals(&self, member_id: MemberId) -> Result<Totals> {
        Ok(self.snapshot(member_id).await?.totals())
    }

    pub async fn events(&self, member_id: MemberId) -> Result<Vec<PointEvent>> {
        Ok(self.snapshot(member_id).await?.events().to_vec())
    }

    pub async fn distinct_activity_ids(&self, member_id: MemberId) -> Result<HashSet<ActivityId>> {
        Ok(self.snapshot(member_id).await?.distinct_activity_ids())
    }

    pub async fn activity_count(
        &self,
        member_id: MemberId,
        activity_id: ActivityId,
    ) -> Result<usize> {
        Ok(self.snapshot(member_id).await?.activity_count(activity_id))
    }

    pub async fn members(&self) -> Result<Vec<MemberId>> {
        self.repo.members().await
    }

    pub(crate) async fn record(&self, event: PointEvent) -> Result<bool> {
        self.repo.insert(event).await
    }

    pub(crate) async fn delete(
        &self,
        source: PointSource,
        source_ref_id: i64,
    ) -> Result<Vec<MemberId>> {
        self.repo.delete_by_source(source, source_ref_id).await
    }
}
