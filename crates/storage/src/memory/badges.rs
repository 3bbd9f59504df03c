use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use eyre::Result;
use model::{badge::Badge, ids::BadgeId};
use parking_lot::RwLock;

use crate::repo::BadgeRepo;

#[derive(Default, Clone)]
pub struct MemoryBadges {
    badges: Arc<RwLock<BTreeMap<BadgeId, Badge>>>,
}

#[async_trait]
impl BadgeRepo for MemoryBadges {
    async fn upsert(&self, badge: Badge) -> Result<()> {
        self.badges.write().insert(badge.id, badge);
        Ok(())
    }

    async fn get(&self, id: BadgeId) -> Result<Option<Badge>> {
        Ok(self.badges.read().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Badge>> {
        Ok(self.badges.read().values().cloned().collect())
    }

    async fn list_active(&self) -> Result<Vec<Badge>> {
        Ok(self
            .badges
            .read()
            .values()
            .filter(|badge| badge.is_active)
            .cloned()
            .collect())
    }
}
