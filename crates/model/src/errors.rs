use thiserror::Error;

use crate::badge::criteria::CriteriaKind;

/// A badge whose criteria cannot be evaluated. Never fatal: the badge is
/// treated as ineligible until an administrator fixes it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("Unknown criteria kind: {0}")]
    UnknownKind(String),
    #[error("Missing extra parameters for {0}")]
    MissingExtra(CriteriaKind),
    #[error("Invalid extra parameters for {kind}: {reason}")]
    InvalidExtra { kind: CriteriaKind, reason: String },
    #[error("Negative threshold {threshold} for {kind}")]
    NegativeThreshold { kind: CriteriaKind, threshold: i64 },
}
