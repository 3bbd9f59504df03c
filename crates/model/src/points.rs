use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::{ActivityId, MemberId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Gottesdienst,
    Gemeinde,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PointSource {
    Activity,
    Bonus,
    Event,
}

/// One immutable contribution to a member's tally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointEvent {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub member_id: MemberId,
    #[serde(default)]
    pub category: Option<Category>,
    pub points: i64,
    pub source: PointSource,
    pub source_ref_id: i64,
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    /// Day of participation, not of submission.
    pub occurred_at: NaiveDate,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl PointEvent {
    pub fn activity(
        member_id: MemberId,
        request_id: i64,
        activity_id: ActivityId,
        points: i64,
        category: Category,
        occurred_at: NaiveDate,
    ) -> PointEvent {
        PointEvent {
            id: ObjectId::new(),
            member_id,
            category: Some(category),
            points,
            source: PointSource::Activity,
            source_ref_id: request_id,
            activity_id: Some(activity_id),
            occurred_at,
            created_at: Utc::now(),
        }
    }

    pub fn bonus(
        member_id: MemberId,
        bonus_id: i64,
        points: i64,
        category: Option<Category>,
        occurred_at: NaiveDate,
    ) -> PointEvent {
        PointEvent {
            id: ObjectId::new(),
            member_id,
            category,
            points,
            source: PointSource::Bonus,
            source_ref_id: bonus_id,
            activity_id: None,
            occurred_at,
            created_at: Utc::now(),
        }
    }

    pub fn event(
        member_id: MemberId,
        event_id: i64,
        activity_id: Option<ActivityId>,
        points: i64,
        category: Option<Category>,
        occurred_at: NaiveDate,
    ) -> PointEvent {
        PointEvent {
            id: ObjectId::new(),
            member_id,
            category,
            points,
            source: PointSource::Event,
            source_ref_id: event_id,
            activity_id,
            occurred_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_activity(&self) -> bool {
        self.source == PointSource::Activity
    }

    pub fn is_bonus(&self) -> bool {
        self.source == PointSource::Bonus
    }
}

/// `total` is `gottesdienst + gemeinde + bonus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub gottesdienst: i64,
    pub gemeinde: i64,
    pub bonus: i64,
    pub total: i64,
}

impl Totals {
    pub fn category(&self, category: Category) -> i64 {
        match category {
            Category::Gottesdienst => self.gottesdienst,
            Category::Gemeinde => self.gemeinde,
        }
    }
}
