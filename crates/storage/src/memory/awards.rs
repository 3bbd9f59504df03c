use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use eyre::Result;
use model::{
    award::Award,
    ids::{BadgeId, MemberId},
};
use parking_lot::RwLock;

use crate::repo::AwardRepo;

#[derive(Default, Clone)]
pub struct MemoryAwards {
    awards: Arc<RwLock<HashMap<(MemberId, BadgeId), Award>>>,
}

#[async_trait]
impl AwardRepo for MemoryAwards {
    async fn insert_if_absent(&self, award: Award) -> Result<bool> {
        let mut awards = self.awards.write();
        let key = (award.member_id, award.badge_id);
        if awards.contains_key(&key) {
            return Ok(false);
        }
        awards.insert(key, award);
        Ok(true)
    }

    async fn member_awards(&self, member_id: MemberId) -> Result<Vec<Award>> {
        let mut awards: Vec<_> = self
            .awards
            .read()
            .values()
            .filter(|award| award.member_id == member_id)
            .cloned()
            .collect();
        awards.sort_by(|a, b| b.awarded_at.cmp(&a.awarded_at));
        Ok(awards)
    }

    async fn members(&self) -> Result<Vec<MemberId>> {
        let members: BTreeSet<_> = self.awards.read().keys().map(|(member, _)| *member).collect();
        Ok(members.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let store = MemoryAwards::default();
        let award = Award::new(MemberId(1), BadgeId(1), Utc::now());
        assert!(store.insert_if_absent(award.clone()).await.unwrap());
        assert!(!store.insert_if_absent(award).await.unwrap());
        assert!(!store
            .insert_if_absent(Award::new(MemberId(1), BadgeId(1), Utc::now()))
            .await
            .unwrap());
        assert!(store
            .insert_if_absent(Award::new(MemberId(2), BadgeId(1), Utc::now()))
            .await
            .unwrap());
        assert_eq!(store.member_awards(MemberId(1)).await.unwrap().len(), 1);
        assert_eq!(store.members().await.unwrap(), vec![MemberId(1), MemberId(2)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_create_one_row() {
        let store = MemoryAwards::default();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_if_absent(Award::new(MemberId(7), BadgeId(3), Utc::now()))
                    .await
                    .unwrap()
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.member_awards(MemberId(7)).await.unwrap().len(), 1);
    }
}
