use std::collections::{BTreeSet, HashSet};

use chrono::{Days, NaiveDate};

use crate::{
    ids::{ActivityId, MemberId},
    points::{Category, PointEvent, Totals},
};

/// Everything the evaluator may know about one member, read in one go.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    member_id: MemberId,
    events: Vec<PointEvent>,
}

impl LedgerSnapshot {
    pub fn new(member_id: MemberId, mut events: Vec<PointEvent>) -> Self {
        events.retain(|event| event.member_id == member_id);
        events.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then(a.created_at.cmp(&b.created_at))
        });
        LedgerSnapshot { member_id, events }
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn events(&self) -> &[PointEvent] {
        &self.events
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for event in &self.events {
            if event.is_bonus() {
                totals.bonus += event.points;
                continue;
            }
            match event.category {
                Some(Category::Gottesdienst) => totals.gottesdienst += event.points,
                Some(Category::Gemeinde) => totals.gemeinde += event.points,
                None => {}
            }
        }
        totals.total = totals.gottesdienst + totals.gemeinde + totals.bonus;
        totals
    }

    /// Activity ids referenced by any event, activity or event sourced.
    pub fn distinct_activity_ids(&self) -> HashSet<ActivityId> {
        self.events
            .iter()
            .filter_map(|event| event.activity_id)
            .collect()
    }

    pub fn has_activity(&self, activity_id: ActivityId) -> bool {
        self.events
            .iter()
            .any(|event| event.activity_id == Some(activity_id))
    }

    pub fn activity_count(&self, activity_id: ActivityId) -> usize {
        self.events
            .iter()
            .filter(|event| event.activity_id == Some(activity_id))
            .count()
    }

    pub fn activity_events(&self) -> impl Iterator<Item = &PointEvent> {
        self.events.iter().filter(|event| event.is_activity())
    }

    pub fn activity_event_count(&self) -> usize {
        self.activity_events().count()
    }

    pub fn unique_activity_count(&self) -> usize {
        self.activity_events()
            .filter_map(|event| event.activity_id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn category_activity_ids(&self, category: Category) -> HashSet<ActivityId> {
        self.activity_events()
            .filter(|event| event.category == Some(category))
            .filter_map(|event| event.activity_id)
            .collect()
    }

    /// Distinct participation days of activity-sourced events, ascending.
    pub fn activity_days(&self) -> Vec<NaiveDate> {
        self.activity_events()
            .map(|event| event.occurred_at)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Activity-sourced events whose day lies in `(today - days, today]`.
    /// A window reaching past the calendar start covers the whole history.
    pub fn activity_events_within(&self, today: NaiveDate, days: u32) -> usize {
        let from = today.checked_sub_days(Days::new(u64::from(days)));
        self.activity_events()
            .filter(|event| from.map_or(true, |from| event.occurred_at > from))
            .filter(|event| event.occurred_at <= today)
            .count()
    }
}
