use crate::types::{DateDay, DbId};

/// Domain-rule violations. Every variant is a deterministic, recoverable
/// rejection raised before any mutation; the store is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Semester date interval intersects a live semester's interval.
    #[error("Semester dates overlap with an existing semester ({start} to {end})")]
    Overlap { start: DateDay, end: DateDay },

    /// A live tier of the same scholarship already carries this percentage.
    #[error("Service tier with percentage {percentage} already exists for scholarship {scholarship_id}")]
    DuplicateTier {
        scholarship_id: DbId,
        percentage: f64,
    },

    /// A live inscription already exists for this commitment and semester.
    #[error("Commitment {commitment_id} is already enrolled in semester {semester_id}")]
    AlreadyEnrolled {
        commitment_id: DbId,
        semester_id: DbId,
    },

    /// Removal blocked: live dependents still reference the entity.
    #[error("Cannot remove {entity}: {count} live {dependent}(s) still reference it")]
    HasDependents {
        entity: &'static str,
        dependent: &'static str,
        count: i64,
    },

    /// Referenced entity is absent or tombstoned.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Any other domain-rule violation with a human-readable message.
    #[error("Validation failed: {0}")]
    Validation(String),
}
