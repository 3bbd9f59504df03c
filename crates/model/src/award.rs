use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BadgeId, MemberId};

/// Member `member_id` has earned `badge_id`. Unique per pair, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Award {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub member_id: MemberId,
    pub badge_id: BadgeId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub awarded_at: DateTime<Utc>,
}

impl Award {
    pub fn new(member_id: MemberId, badge_id: BadgeId, awarded_at: DateTime<Utc>) -> Award {
        Award {
            id: ObjectId::new(),
            member_id,
            badge_id,
            awarded_at,
        }
    }
}

/// Badge persisted by one particular reconciliation call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewlyAwarded {
    pub badge_id: BadgeId,
    pub name: String,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EarnedBadge {
    pub badge_id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BadgeProgress {
    pub badge_id: BadgeId,
    pub name: String,
    pub eligible: bool,
    pub progress: f64,
    pub earned: bool,
}
