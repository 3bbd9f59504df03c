use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use eyre::Result;
use futures_util::TryStreamExt as _;
use log::info;
use model::{
    ids::MemberId,
    points::{PointEvent, PointSource},
};
use mongodb::{options::IndexOptions, Collection, Database, IndexModel};

use crate::{is_duplicate_key, repo::PointsRepo};

const COLLECTION: &str = "point_events";

#[derive(Clone)]
pub struct PointsStore {
    events: Arc<Collection<PointEvent>>,
}

impl PointsStore {
    pub(crate) async fn new(db: &Database) -> Result<Self> {
        let events = db.collection(COLLECTION);
        events
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "member_id": 1, "occurred_at": 1 })
                    .build(),
            )
            .await?;
        events
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "source": 1, "source_ref_id": 1, "member_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(PointsStore {
            events: Arc::new(events),
        })
    }
}

#[async_trait]
impl PointsRepo for PointsStore {
    async fn insert(&self, event: PointEvent) -> Result<bool> {
        match self.events.insert_one(&event).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => {
                info!(
                    "Point event {}:{} for member {} already recorded",
                    event.source, event.source_ref_id, event.member_id
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_by_source(
        &self,
        source: PointSource,
        source_ref_id: i64,
    ) -> Result<Vec<MemberId>> {
        let filter = doc! {
            "source": source.to_string(),
            "source_ref_id": source_ref_id,
        };
        let affected: Vec<PointEvent> = self
            .events
            .find(filter.clone())
            .await?
            .try_collect()
            .await?;
        let result = self.events.delete_many(filter).await?;
        info!(
            "Deleted {} point events of {}:{}",
            result.deleted_count, source, source_ref_id
        );

        let mut members: Vec<_> = affected.into_iter().map(|event| event.member_id).collect();
        members.sort();
        members.dedup();
        Ok(members)
    }

    async fn member_events(&self, member_id: MemberId) -> Result<Vec<PointEvent>> {
        let cursor = self
            .events
            .find(doc! { "member_id": member_id.id() })
            .sort(doc! { "occurred_at": 1, "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn members(&self) -> Result<Vec<MemberId>> {
        let ids = self.events.distinct("member_id", doc! {}).await?;
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            members.push(bson::from_bson(id)?);
        }
        Ok(members)
    }
}
