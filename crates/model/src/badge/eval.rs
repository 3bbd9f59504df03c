use chrono::NaiveDate;
use serde::Serialize;

use crate::snapshot::LedgerSnapshot;

use super::criteria::Criteria;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub eligible: bool,
    /// Share of the requirement already met, in `[0, 1]`.
    pub progress: f64,
}

impl Evaluation {
    pub fn ineligible() -> Evaluation {
        Evaluation {
            eligible: false,
            progress: 0.0,
        }
    }

    fn binary(eligible: bool) -> Evaluation {
        Evaluation {
            eligible,
            progress: if eligible { 1.0 } else { 0.0 },
        }
    }

    fn threshold(value: i64, threshold: i64) -> Evaluation {
        Evaluation {
            eligible: value >= threshold,
            progress: ratio(value, threshold),
        }
    }
}

fn ratio(value: i64, threshold: i64) -> f64 {
    if threshold <= 0 {
        return 1.0;
    }
    (value as f64 / threshold as f64).clamp(0.0, 1.0)
}

fn count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Length of the longest run of consecutive calendar days.
/// `days` must be sorted ascending and free of duplicates.
pub fn longest_streak(days: &[NaiveDate]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*day);
    }
    longest
}

impl Criteria {
    /// Pure: depends only on the snapshot, the criteria and `today`.
    pub fn evaluate(&self, snapshot: &LedgerSnapshot, today: NaiveDate) -> Evaluation {
        match self {
            Criteria::TotalPoints { threshold } => {
                let totals = snapshot.totals();
                let sum = totals.gottesdienst + totals.gemeinde + totals.bonus;
                Evaluation::threshold(sum, *threshold)
            }
            Criteria::GottesdienstPoints { threshold } => {
                Evaluation::threshold(snapshot.totals().gottesdienst, *threshold)
            }
            Criteria::GemeindePoints { threshold } => {
                Evaluation::threshold(snapshot.totals().gemeinde, *threshold)
            }
            Criteria::BonusPoints { threshold } => {
                Evaluation::threshold(snapshot.totals().bonus, *threshold)
            }
            Criteria::SpecificActivity { activity_id } => {
                Evaluation::binary(snapshot.has_activity(*activity_id))
            }
            Criteria::ActivityCount { threshold } => {
                Evaluation::threshold(count(snapshot.activity_event_count()), *threshold)
            }
            Criteria::UniqueActivities { threshold } => {
                Evaluation::threshold(count(snapshot.unique_activity_count()), *threshold)
            }
            Criteria::BothCategories { threshold } => {
                let totals = snapshot.totals();
                Evaluation {
                    eligible: totals.gottesdienst >= *threshold && totals.gemeinde >= *threshold,
                    progress: ratio(totals.gottesdienst, *threshold)
                        .min(ratio(totals.gemeinde, *threshold)),
                }
            }
            Criteria::ActivityCombination { activity_ids } => {
                if activity_ids.is_empty() {
                    return Evaluation::ineligible();
                }
                let done = snapshot.distinct_activity_ids();
                let satisfied = activity_ids.iter().filter(|id| done.contains(id)).count();
                Evaluation {
                    eligible: satisfied == activity_ids.len(),
                    progress: satisfied as f64 / activity_ids.len() as f64,
                }
            }
            Criteria::CategoryActivities {
                threshold,
                category,
            } => Evaluation::threshold(
                count(snapshot.category_activity_ids(*category).len()),
                *threshold,
            ),
            Criteria::TimeBased { threshold, days } => Evaluation::threshold(
                count(snapshot.activity_events_within(today, *days)),
                *threshold,
            ),
            Criteria::Streak { threshold } => Evaluation::threshold(
                count(longest_streak(&snapshot.activity_days())),
                *threshold,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ids::{ActivityId, MemberId},
        points::{Category, PointEvent},
    };

    const MEMBER: MemberId = MemberId(1);

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn today() -> NaiveDate {
        day("2024-03-01")
    }

    fn activity(activity: i64, points: i64, category: Category, at: &str) -> PointEvent {
        PointEvent::activity(MEMBER, 0, ActivityId(activity), points, category, day(at))
    }

    fn snapshot(events: Vec<PointEvent>) -> LedgerSnapshot {
        LedgerSnapshot::new(MEMBER, events)
    }

    fn eval(criteria: Criteria, events: Vec<PointEvent>) -> Evaluation {
        criteria.evaluate(&snapshot(events), today())
    }

    fn assert_progress(evaluation: Evaluation, expected: f64) {
        assert!(
            (evaluation.progress - expected).abs() < 1e-3,
            "progress {} != {}",
            evaluation.progress,
            expected
        );
    }

    #[test]
    fn test_total_points_capped_progress() {
        let mut events = Vec::new();
        for i in 0..6 {
            events.push(activity(i, 1, Category::Gottesdienst, "2024-01-01"));
        }
        for i in 0..5 {
            events.push(activity(10 + i, 1, Category::Gemeinde, "2024-01-02"));
        }
        let result = eval(Criteria::TotalPoints { threshold: 10 }, events);
        assert!(result.eligible);
        assert_eq!(result.progress, 1.0);
    }

    #[test]
    fn test_total_points_includes_bonus() {
        let events = vec![
            activity(1, 4, Category::Gemeinde, "2024-01-01"),
            PointEvent::bonus(MEMBER, 1, 3, None, day("2024-01-02")),
        ];
        let result = eval(Criteria::TotalPoints { threshold: 10 }, events);
        assert!(!result.eligible);
        assert_progress(result, 0.7);
    }

    #[test]
    fn test_total_points_ignores_uncategorized_events() {
        let events = vec![PointEvent::event(MEMBER, 5, None, 10, None, day("2024-01-03"))];
        let result = eval(Criteria::TotalPoints { threshold: 10 }, events);
        assert!(!result.eligible);
        assert_eq!(result.progress, 0.0);
    }

    #[test]
    fn test_time_based_wide_window() {
        let events = vec![
            activity(1, 1, Category::Gemeinde, "2024-01-01"),
            activity(2, 1, Category::Gemeinde, "2024-02-20"),
        ];
        let criteria = Criteria::TimeBased {
            threshold: 2,
            days: u32::MAX,
        };
        assert!(eval(criteria.clone(), events.clone()).eligible);
        let far_past = criteria.evaluate(&snapshot(events), NaiveDate::MIN);
        assert!(!far_past.eligible);
    }

    #[test]
    fn test_category_points() {
        let events = vec![
            activity(1, 4, Category::Gottesdienst, "2024-01-01"),
            activity(2, 2, Category::Gemeinde, "2024-01-01"),
            PointEvent::bonus(MEMBER, 1, 9, Some(Category::Gemeinde), day("2024-01-02")),
            PointEvent::event(MEMBER, 5, None, 1, Some(Category::Gemeinde), day("2024-01-03")),
        ];
        let gottesdienst = eval(Criteria::GottesdienstPoints { threshold: 4 }, events.clone());
        assert!(gottesdienst.eligible);

        let gemeinde = eval(Criteria::GemeindePoints { threshold: 4 }, events.clone());
        assert!(!gemeinde.eligible);
        assert_progress(gemeinde, 0.75);

        let bonus = eval(Criteria::BonusPoints { threshold: 9 }, events);
        assert!(bonus.eligible);
    }

    #[test]
    fn test_specific_activity() {
        let criteria = Criteria::SpecificActivity {
            activity_id: ActivityId(42),
        };
        let hit = eval(criteria.clone(), vec![activity(42, 1, Category::Gemeinde, "2024-01-01")]);
        assert!(hit.eligible);
        assert_eq!(hit.progress, 1.0);

        let miss = eval(criteria.clone(), vec![activity(7, 1, Category::Gemeinde, "2024-01-01")]);
        assert!(!miss.eligible);
        assert_eq!(miss.progress, 0.0);

        let from_event = eval(
            criteria,
            vec![PointEvent::event(
                MEMBER,
                3,
                Some(ActivityId(42)),
                2,
                Some(Category::Gemeinde),
                day("2024-01-01"),
            )],
        );
        assert!(from_event.eligible);
    }

    #[test]
    fn test_activity_count_vs_unique() {
        let events = vec![
            activity(1, 1, Category::Gemeinde, "2024-01-01"),
            activity(1, 1, Category::Gemeinde, "2024-01-02"),
            activity(2, 1, Category::Gemeinde, "2024-01-03"),
            PointEvent::event(MEMBER, 9, Some(ActivityId(3)), 1, None, day("2024-01-04")),
        ];
        assert!(eval(Criteria::ActivityCount { threshold: 3 }, events.clone()).eligible);
        let unique = eval(Criteria::UniqueActivities { threshold: 3 }, events);
        assert!(!unique.eligible);
        assert_progress(unique, 2.0 / 3.0);
    }

    #[test]
    fn test_both_categories() {
        let events = vec![
            activity(1, 5, Category::Gottesdienst, "2024-01-01"),
            activity(2, 2, Category::Gemeinde, "2024-01-01"),
        ];
        let result = eval(Criteria::BothCategories { threshold: 4 }, events.clone());
        assert!(!result.eligible);
        assert_progress(result, 0.5);

        let mut more = events;
        more.push(activity(3, 2, Category::Gemeinde, "2024-01-02"));
        assert!(eval(Criteria::BothCategories { threshold: 4 }, more).eligible);
    }

    #[test]
    fn test_activity_combination() {
        let criteria = Criteria::ActivityCombination {
            activity_ids: vec![ActivityId(1), ActivityId(2), ActivityId(3)],
        };
        let mut events = vec![
            activity(1, 1, Category::Gemeinde, "2024-01-01"),
            activity(2, 1, Category::Gemeinde, "2024-01-02"),
        ];
        let partial = eval(criteria.clone(), events.clone());
        assert!(!partial.eligible);
        assert_progress(partial, 0.667);

        events.push(activity(3, 1, Category::Gemeinde, "2024-01-03"));
        let complete = eval(criteria, events);
        assert!(complete.eligible);
        assert_eq!(complete.progress, 1.0);
    }

    #[test]
    fn test_category_activities_counts_distinct() {
        let criteria = Criteria::CategoryActivities {
            threshold: 2,
            category: Category::Gottesdienst,
        };
        let events = vec![
            activity(1, 1, Category::Gottesdienst, "2024-01-01"),
            activity(1, 1, Category::Gottesdienst, "2024-01-08"),
            activity(2, 1, Category::Gemeinde, "2024-01-09"),
        ];
        let result = eval(criteria.clone(), events.clone());
        assert!(!result.eligible);
        assert_progress(result, 0.5);

        let mut more = events;
        more.push(activity(3, 1, Category::Gottesdienst, "2024-01-15"));
        assert!(eval(criteria, more).eligible);
    }

    #[test]
    fn test_time_based_window() {
        let events = vec![
            activity(1, 1, Category::Gemeinde, "2024-02-10"),
            activity(2, 1, Category::Gemeinde, "2024-02-20"),
        ];
        let time_based = eval(
            Criteria::TimeBased {
                threshold: 2,
                days: 7,
            },
            events.clone(),
        );
        assert!(!time_based.eligible);
        assert_eq!(time_based.progress, 0.0);
        assert!(eval(Criteria::ActivityCount { threshold: 2 }, events).eligible);

        let recent = vec![
            activity(1, 1, Category::Gemeinde, "2024-02-24"),
            activity(2, 1, Category::Gemeinde, "2024-03-01"),
        ];
        let result = eval(
            Criteria::TimeBased {
                threshold: 2,
                days: 7,
            },
            recent,
        );
        assert!(result.eligible);
    }

    #[test]
    fn test_streak() {
        let events = vec![
            activity(1, 1, Category::Gemeinde, "2024-01-01"),
            activity(2, 1, Category::Gemeinde, "2024-01-02"),
            activity(3, 1, Category::Gemeinde, "2024-01-03"),
            activity(4, 1, Category::Gemeinde, "2024-01-05"),
        ];
        let result = eval(Criteria::Streak { threshold: 3 }, events.clone());
        assert!(result.eligible);

        let result = eval(Criteria::Streak { threshold: 4 }, events);
        assert!(!result.eligible);
        assert_progress(result, 0.75);
    }

    #[test]
    fn test_longest_streak_keeps_maximum() {
        let days: Vec<_> = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10", "2024-01-11"]
            .iter()
            .map(|d| day(d))
            .collect();
        assert_eq!(longest_streak(&days), 3);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_streak(&[day("2024-02-28"), day("2024-02-29"), day("2024-03-01")]), 3);
    }

    #[test]
    fn test_streak_ignores_bonus_and_duplicates() {
        let events = vec![
            activity(1, 1, Category::Gemeinde, "2024-01-01"),
            activity(2, 1, Category::Gottesdienst, "2024-01-01"),
            PointEvent::bonus(MEMBER, 1, 1, None, day("2024-01-02")),
            activity(3, 1, Category::Gemeinde, "2024-01-03"),
        ];
        let result = eval(Criteria::Streak { threshold: 2 }, events);
        assert!(!result.eligible);
        assert_progress(result, 0.5);
    }

    #[test]
    fn test_zero_threshold_is_met_by_empty_ledger() {
        let result = eval(Criteria::ActivityCount { threshold: 0 }, vec![]);
        assert!(result.eligible);
        assert_eq!(result.progress, 1.0);
    }

    #[test]
    fn test_monotonic_under_superset() {
        let base = vec![
            activity(1, 3, Category::Gottesdienst, "2024-01-01"),
            activity(2, 3, Category::Gemeinde, "2024-01-02"),
        ];
        let mut superset = base.clone();
        superset.push(activity(3, 1, Category::Gemeinde, "2024-01-20"));
        superset.push(PointEvent::bonus(MEMBER, 1, 2, None, day("2024-01-21")));

        let all = [
            Criteria::TotalPoints { threshold: 6 },
            Criteria::GottesdienstPoints { threshold: 3 },
            Criteria::GemeindePoints { threshold: 3 },
            Criteria::ActivityCount { threshold: 2 },
            Criteria::UniqueActivities { threshold: 2 },
            Criteria::BothCategories { threshold: 3 },
            Criteria::SpecificActivity {
                activity_id: ActivityId(1),
            },
            Criteria::ActivityCombination {
                activity_ids: vec![ActivityId(1), ActivityId(2)],
            },
            Criteria::CategoryActivities {
                threshold: 1,
                category: Category::Gemeinde,
            },
        ];
        for criteria in all {
            assert!(eval(criteria.clone(), base.clone()).eligible, "{:?}", criteria);
            assert!(eval(criteria.clone(), superset.clone()).eligible, "{:?}", criteria);
        }
    }
}
