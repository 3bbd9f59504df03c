use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use eyre::Result;
use futures_util::TryStreamExt as _;
use model::{award::Award, ids::MemberId};
use mongodb::{options::IndexOptions, Collection, Database, IndexModel};

use crate::{is_duplicate_key, repo::AwardRepo};

const COLLECTION: &str = "awards";

#[derive(Clone)]
pub struct AwardStore {
    awards: Arc<Collection<Award>>,
}

impl AwardStore {
    pub(crate) async fn new(db: &Database) -> Result<Self> {
        let awards = db.collection(COLLECTION);
        awards
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "member_id": 1, "badge_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        Ok(AwardStore {
            awards: Arc::new(awards),
        })
    }
}

#[async_trait]
impl AwardRepo for AwardStore {
    async fn insert_if_absent(&self, award: Award) -> Result<bool> {
        match self.awards.insert_one(&award).await {
            Ok(_) => Ok(true),
            // Another reconciliation got there first.
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn member_awards(&self, member_id: MemberId) -> Result<Vec<Award>> {
        let cursor = self
            .awards
            .find(doc! { "member_id": member_id.id() })
            .sort(doc! { "awarded_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn members(&self) -> Result<Vec<MemberId>> {
        let ids = self.awards.distinct("member_id", doc! {}).await?;
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            members.push(bson::from_bson(id)?);
        }
        Ok(members)
    }
}
