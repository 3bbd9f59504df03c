use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use eyre::Result;
use futures_util::TryStreamExt as _;
use model::{badge::Badge, ids::BadgeId};
use mongodb::{Collection, Database, IndexModel};

use crate::repo::BadgeRepo;

const COLLECTION: &str = "badges";

#[derive(Clone)]
pub struct BadgeStore {
    badges: Arc<Collection<Badge>>,
}

impl BadgeStore {
    pub(crate) async fn new(db: &Database) -> Result<Self> {
        let badges = db.collection(COLLECTION);
        badges
            .create_index(IndexModel::builder().keys(doc! { "is_active": 1 }).build())
            .await?;
        Ok(BadgeStore {
            badges: Arc::new(badges),
        })
    }
}

#[async_trait]
impl BadgeRepo for BadgeStore {
    async fn upsert(&self, badge: Badge) -> Result<()> {
        self.badges
            .replace_one(doc! { "_id": badge.id.id() }, &badge)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get(&self, id: BadgeId) -> Result<Option<Badge>> {
        Ok(self.badges.find_one(doc! { "_id": id.id() }).await?)
    }

    async fn list(&self) -> Result<Vec<Badge>> {
        let cursor = self.badges.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_active(&self) -> Result<Vec<Badge>> {
        let cursor = self
            .badges
            .find(doc! { "is_active": true })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
