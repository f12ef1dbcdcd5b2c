//! Commitment entity model and projections.

use beca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `commitments` table: a student's binding to one
/// scholarship service tier. At most one live commitment per student is
/// current at any instant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Commitment {
    pub id: DbId,
    pub student_id: DbId,
    pub service_details_id: DbId,
    pub is_current: bool,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of an assign operation: the new current commitment together with
/// the one it superseded, observed from a single transaction so callers
/// never see an intermediate state.
#[derive(Debug, Clone, Serialize)]
pub struct AssignOutcome {
    /// The previously current commitment, already flipped off. `None` when
    /// the student had no current commitment.
    pub superseded: Option<Commitment>,
    pub current: Commitment,
}

/// Per-student commitment listing with tier and scholarship context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommitmentSummary {
    pub id: DbId,
    pub is_current: bool,
    pub scholarship: String,
    pub percentage: f64,
    pub hours_per_semester: i32,
}
