use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use eyre::Result;
use model::{
    ids::MemberId,
    points::{PointEvent, PointSource},
};
use parking_lot::RwLock;

use crate::repo::PointsRepo;

#[derive(Default, Clone)]
pub struct MemoryPoints {
    events: Arc<RwLock<Vec<PointEvent>>>,
}

#[async_trait]
impl PointsRepo for MemoryPoints {
    async fn insert(&self, event: PointEvent) -> Result<bool> {
        let mut events = self.events.write();
        let exists = events.iter().any(|stored| {
            stored.source == event.source
                && stored.source_ref_id == event.source_ref_id
                && stored.member_id == event.member_id
        });
        if exists {
            return Ok(false);
        }
        events.push(event);
        Ok(true)
    }

    async fn delete_by_source(
        &self,
        source: PointSource,
        source_ref_id: i64,
    ) -> Result<Vec<MemberId>> {
        let mut events = self.events.write();
        let mut members = BTreeSet::new();
        events.retain(|event| {
            let matches = event.source == source && event.source_ref_id == source_ref_id;
            if matches {
                members.insert(event.member_id);
            }
            !matches
        });
        Ok(members.into_iter().collect())
    }

    async fn member_events(&self, member_id: MemberId) -> Result<Vec<PointEvent>> {
        let mut events: Vec<_> = self
            .events
            .read()
            .iter()
            .filter(|event| event.member_id == member_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(events)
    }

    async fn members(&self) -> Result<Vec<MemberId>> {
        let members: BTreeSet<_> = self.events.read().iter().map(|e| e.member_id).collect();
        Ok(members.into_iter().collect())
    }
}
