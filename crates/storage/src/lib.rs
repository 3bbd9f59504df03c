pub mod awards;
pub mod badges;
pub mod memory;
pub mod points;
pub mod repo;
mod session;

use std::sync::Arc;

use awards::AwardStore;
use badges::BadgeStore;
use eyre::Result;
use mongodb::error::{ErrorKind, WriteFailure};
use points::PointsStore;
use repo::{AwardRepo, BadgeRepo, PointsRepo};

const DB_NAME: &str = "konfi_badges";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct Storage {
    pub points: Arc<dyn PointsRepo>,
    pub badges: Arc<dyn BadgeRepo>,
    pub awards: Arc<dyn AwardRepo>,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = session::connect(uri, DB_NAME).await?;
        let points = PointsStore::new(&db).await?;
        let badges = BadgeStore::new(&db).await?;
        let awards = AwardStore::new(&db).await?;

        Ok(Storage {
            points: Arc::new(points),
            badges: Arc::new(badges),
            awards: Arc::new(awards),
        })
    }

    pub fn in_memory() -> Self {
        Storage {
            points: Arc::new(memory::MemoryPoints::default()),
            badges: Arc::new(memory::MemoryBadges::default()),
            awards: Arc::new(memory::MemoryAwards::default()),
        }
    }
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        _ => false,
    }
}
