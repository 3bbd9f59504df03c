use async_trait::async_trait;
use eyre::Result;
use model::{
    award::Award,
    badge::Badge,
    ids::{BadgeId, MemberId},
    points::{PointEvent, PointSource},
};

/// Append-only store of point events. Reads reflect the latest committed write.
#[async_trait]
pub trait PointsRepo: Send + Sync {
    /// Returns `false` if an event for the same
    /// `(source, source_ref_id, member_id)` is already stored.
    async fn insert(&self, event: PointEvent) -> Result<bool>;

    /// Removes every event of the given source row and returns the members
    /// that lost points.
    async fn delete_by_source(&self, source: PointSource, source_ref_id: i64)
        -> Result<Vec<MemberId>>;

    /// Events of one member ordered by `occurred_at`.
    async fn member_events(&self, member_id: MemberId) -> Result<Vec<PointEvent>>;

    async fn members(&self) -> Result<Vec<MemberId>>;
}

#[async_trait]
pub trait BadgeRepo: Send + Sync {
    async fn upsert(&self, badge: Badge) -> Result<()>;

    async fn get(&self, id: BadgeId) -> Result<Option<Badge>>;

    async fn list(&self) -> Result<Vec<Badge>>;

    async fn list_active(&self) -> Result<Vec<Badge>>;
}

#[async_trait]
pub trait AwardRepo: Send + Sync {
    /// Insert-or-ignore on `(member_id, badge_id)`. Returns `true` only for
    /// the call that actually created the row.
    async fn insert_if_absent(&self, award: Award) -> Result<bool>;

    /// Awards of one member, newest first.
    async fn member_awards(&self, member_id: MemberId) -> Result<Vec<Award>>;

    async fn members(&self) -> Result<Vec<MemberId>>;
}
