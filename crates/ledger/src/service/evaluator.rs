use chrono::{Local, NaiveDate};
use eyre::Result;
use log::warn;
use model::{
    badge::{eval::Evaluation, CriteriaDefinition},
    ids::MemberId,
    snapshot::LedgerSnapshot,
};

use super::points::Points;

#[derive(Clone)]
pub struct Evaluator {
    points: Points,
}

impl Evaluator {
    pub(crate) fn new(points: Points) -> Self {
        Evaluator { points }
    }

    /// Reads the member's ledger and evaluates one badge against it.
    /// Only storage failures are errors; a broken definition is ineligible.
    pub async fn evaluate(
        &self,
        member_id: MemberId,
        definition: &CriteriaDefinition,
    ) -> Result<Evaluation> {
        let snapshot = self.points.snapshot(member_id).await?;
        Ok(evaluate_definition(definition, &snapshot, today()))
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn evaluate_definition(
    definition: &CriteriaDefinition,
    snapshot: &LedgerSnapshot,
    today: NaiveDate,
) -> Evaluation {
    match &definition.criteria {
        Ok(criteria) => criteria.evaluate(snapshot, today),
        Err(err) => {
            warn!(
                "Badge {} ({}) skipped for member {}: {}",
                definition.badge_id,
                definition.name,
                snapshot.member_id(),
                err
            );
            Evaluation::ineligible()
        }
    }
}
