pub mod criteria;
pub mod eval;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::CriteriaError, ids::BadgeId};
use criteria::Criteria;

/// Catalog row as administrators edit it. `kind` and `extra` are kept raw so
/// that rows written by a newer catalog still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    #[serde(rename = "_id")]
    pub id: BadgeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub kind: String,
    pub threshold: i64,
    #[serde(default)]
    pub extra: serde_json::Value,
    pub is_active: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Badge {
    pub fn new(
        id: BadgeId,
        name: String,
        kind: String,
        threshold: i64,
        extra: serde_json::Value,
    ) -> Badge {
        let now = Utc::now();
        Badge {
            id,
            name,
            description: String::new(),
            icon: None,
            kind,
            threshold,
            extra,
            is_active: true,
            is_hidden: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn criteria(&self) -> Result<Criteria, CriteriaError> {
        Criteria::parse(&self.kind, self.threshold, &self.extra)
    }
}

/// A badge with its criteria validated once, at the catalog boundary.
#[derive(Debug, Clone)]
pub struct CriteriaDefinition {
    pub badge_id: BadgeId,
    pub name: String,
    pub is_hidden: bool,
    pub criteria: Result<Criteria, CriteriaError>,
}

impl From<&Badge> for CriteriaDefinition {
    fn from(badge: &Badge) -> Self {
        CriteriaDefinition {
            badge_id: badge.id,
            name: badge.name.clone(),
            is_hidden: badge.is_hidden,
            criteria: badge.criteria(),
        }
    }
}
