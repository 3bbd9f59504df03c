use std::str::FromStr as _;

use serde::{de::DeserializeOwned, Deserialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
    errors::CriteriaError,
    ids::ActivityId,
    points::Category,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CriteriaKind {
    TotalPoints,
    GottesdienstPoints,
    GemeindePoints,
    BonusPoints,
    SpecificActivity,
    ActivityCount,
    UniqueActivities,
    BothCategories,
    ActivityCombination,
    CategoryActivities,
    TimeBased,
    Streak,
}

/// Validated badge rule. Every variant carries exactly what its evaluation
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    TotalPoints { threshold: i64 },
    GottesdienstPoints { threshold: i64 },
    GemeindePoints { threshold: i64 },
    BonusPoints { threshold: i64 },
    SpecificActivity { activity_id: ActivityId },
    ActivityCount { threshold: i64 },
    UniqueActivities { threshold: i64 },
    BothCategories { threshold: i64 },
    ActivityCombination { activity_ids: Vec<ActivityId> },
    CategoryActivities { threshold: i64, category: Category },
    TimeBased { threshold: i64, days: u32 },
    Streak { threshold: i64 },
}

#[derive(Deserialize)]
struct SpecificActivityExtra {
    activity_id: ActivityId,
}

#[derive(Deserialize)]
struct ActivityCombinationExtra {
    activity_ids: Vec<ActivityId>,
}

#[derive(Deserialize)]
struct CategoryExtra {
    #[serde(alias = "category")]
    required_category: Category,
}

#[derive(Deserialize)]
struct TimeBasedExtra {
    days: u32,
}

/// Longest `time_based` window, roughly a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

fn extra_as<T: DeserializeOwned>(
    kind: CriteriaKind,
    extra: &serde_json::Value,
) -> Result<T, CriteriaError> {
    if extra.is_null() {
        return Err(CriteriaError::MissingExtra(kind));
    }
    serde_json::from_value(extra.clone()).map_err(|err| CriteriaError::InvalidExtra {
        kind,
        reason: err.to_string(),
    })
}

impl Criteria {
    pub fn parse(
        kind: &str,
        threshold: i64,
        extra: &serde_json::Value,
    ) -> Result<Criteria, CriteriaError> {
        let kind = CriteriaKind::from_str(kind)
            .map_err(|_| CriteriaError::UnknownKind(kind.to_owned()))?;
        if threshold < 0 {
            return Err(CriteriaError::NegativeThreshold { kind, threshold });
        }

        Ok(match kind {
            CriteriaKind::TotalPoints => Criteria::TotalPoints { threshold },
            CriteriaKind::GottesdienstPoints => Criteria::GottesdienstPoints { threshold },
            CriteriaKind::GemeindePoints => Criteria::GemeindePoints { threshold },
            CriteriaKind::BonusPoints => Criteria::BonusPoints { threshold },
            CriteriaKind::SpecificActivity => {
                let extra: SpecificActivityExtra = extra_as(kind, extra)?;
                Criteria::SpecificActivity {
                    activity_id: extra.activity_id,
                }
            }
            CriteriaKind::ActivityCount => Criteria::ActivityCount { threshold },
            CriteriaKind::UniqueActivities => Criteria::UniqueActivities { threshold },
            CriteriaKind::BothCategories => Criteria::BothCategories { threshold },
            CriteriaKind::ActivityCombination => {
                let extra: ActivityCombinationExtra = extra_as(kind, extra)?;
                if extra.activity_ids.is_empty() {
                    return Err(CriteriaError::InvalidExtra {
                        kind,
                        reason: "activity_ids is empty".to_owned(),
                    });
                }
                let mut activity_ids = extra.activity_ids;
                activity_ids.sort();
                activity_ids.dedup();
                Criteria::ActivityCombination { activity_ids }
            }
            CriteriaKind::CategoryActivities => {
                let extra: CategoryExtra = extra_as(kind, extra)?;
                Criteria::CategoryActivities {
                    threshold,
                    category: extra.required_category,
                }
            }
            CriteriaKind::TimeBased => {
                let extra: TimeBasedExtra = extra_as(kind, extra)?;
                if extra.days == 0 || extra.days > MAX_WINDOW_DAYS {
                    return Err(CriteriaError::InvalidExtra {
                        kind,
                        reason: format!("days must be in 1..={}", MAX_WINDOW_DAYS),
                    });
                }
                Criteria::TimeBased {
                    threshold,
                    days: extra.days,
                }
            }
            CriteriaKind::Streak => Criteria::Streak { threshold },
        })
    }

    pub fn kind(&self) -> CriteriaKind {
        match self {
            Criteria::TotalPoints { .. } => CriteriaKind::TotalPoints,
            Criteria::GottesdienstPoints { .. } => CriteriaKind::GottesdienstPoints,
            Criteria::GemeindePoints { .. } => CriteriaKind::GemeindePoints,
            Criteria::BonusPoints { .. } => CriteriaKind::BonusPoints,
            Criteria::SpecificActivity { .. } => CriteriaKind::SpecificActivity,
            Criteria::ActivityCount { .. } => CriteriaKind::ActivityCount,
            Criteria::UniqueActivities { .. } => CriteriaKind::UniqueActivities,
            Criteria::BothCategories { .. } => CriteriaKind::BothCategories,
            Criteria::ActivityCombination { .. } => CriteriaKind::ActivityCombination,
            Criteria::CategoryActivities { .. } => CriteriaKind::CategoryActivities,
            Criteria::TimeBased { .. } => CriteriaKind::TimeBased,
            Criteria::Streak { .. } => CriteriaKind::Streak,
        }
    }

}
