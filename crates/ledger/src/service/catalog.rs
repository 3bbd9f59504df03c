use std::sync::Arc;

use chrono::Utc;
use eyre::Result;
use log::info;
use model::{
    badge::{criteria::Criteria, Badge, CriteriaDefinition},
    errors::CriteriaError,
    ids::BadgeId,
};
use storage::repo::BadgeRepo;
use thiserror::Error;

/// Administrator edit of a badge. `kind`, `threshold` and `extra` are
/// validated before anything is stored.
#[derive(Debug, Clone)]
pub struct BadgeInput {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub kind: String,
    pub threshold: i64,
    pub extra: serde_json::Value,
    pub is_active: bool,
    pub is_hidden: bool,
}

impl BadgeInput {
    pub fn new(
        id: BadgeId,
        name: &str,
        kind: &str,
        threshold: i64,
        extra: serde_json::Value,
    ) -> Self {
        BadgeInput {
            id,
            name: name.to_owned(),
            description: String::new(),
            icon: None,
            kind: kind.to_owned(),
            threshold,
            extra,
            is_active: true,
            is_hidden: false,
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    repo: Arc<dyn BadgeRepo>,
}

impl Catalog {
    pub(crate) fn new(repo: Arc<dyn BadgeRepo>) -> Self {
        Catalog { repo }
    }

    /// Only active badges are ever awarded; `is_hidden` is a display concern.
    pub async fn list_active_criteria(&self) -> Result<Vec<CriteriaDefinition>> {
        let badges = self.repo.list_active().await?;
        Ok(badges.iter().map(CriteriaDefinition::from).collect())
    }

    pub async fn get_criteria(&self, id: BadgeId) -> Result<CriteriaDefinition, BadgeError> {
        let badge = self.get_badge(id).await?;
        Ok(CriteriaDefinition::from(&badge))
    }

    pub async fn get_badge(&self, id: BadgeId) -> Result<Badge, BadgeError> {
        self.repo
            .get(id)
            .await?
            .ok_or(BadgeError::BadgeNotFound(id))
    }

    pub async fn find_badge(&self, id: BadgeId) -> Result<Option<Badge>> {
        self.repo.get(id).await
    }

    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        self.repo.list().await
    }

    pub(crate) async fn upsert(&self, input: BadgeInput) -> Result<Badge, BadgeError> {
        let criteria = Criteria::parse(&input.kind, input.threshold, &input.extra)?;
        let existing = self.repo.get(input.id).await?;
        let now = Utc::now();
        let badge = Badge {
            id: input.id,
            name: input.name,
            description: input.description,
            icon: input.icon,
            kind: criteria.kind().to_string(),
            threshold: input.threshold,
            extra: input.extra,
            is_active: input.is_active,
            is_hidden: input.is_hidden,
            created_at: existing.map(|badge| badge.created_at).unwrap_or(now),
            updated_at: now,
        };
        info!("Upserting badge {} ({}): {:?}", badge.id, badge.name, criteria);
        self.repo.upsert(badge.clone()).await?;
        Ok(badge)
    }

    pub(crate) async fn set_active(
        &self,
        id: BadgeId,
        is_active: bool,
    ) -> Result<Badge, BadgeError> {
        let mut badge = self.get_badge(id).await?;
        badge.is_active = is_active;
        badge.updated_at = Utc::now();
        info!("Setting badge {} active: {}", id, is_active);
        self.repo.upsert(badge.clone()).await?;
        Ok(badge)
    }
}

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("Badge not found: {0}")]
    BadgeNotFound(BadgeId),
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(#[from] CriteriaError),
    #[error("Common error: {0:#}")]
    Common(#[from] eyre::Error),
}
