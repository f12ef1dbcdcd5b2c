//! Inscription entity model and projections.

use beca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `inscriptions` table: one commitment enrolled in one
/// semester. `is_complete` is derived from the live hour total and never
/// set directly by callers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inscription {
    pub id: DbId,
    pub commitment_id: DbId,
    pub semester_id: DbId,
    pub is_complete: bool,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inscription listing joined with semester and tier context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InscriptionDetail {
    pub id: DbId,
    pub commitment_id: DbId,
    pub semester_id: DbId,
    pub semester_number: i32,
    pub semester_year: i32,
    pub scholarship: String,
    pub percentage: f64,
    pub is_complete: bool,
    pub created_at: Timestamp,
}

/// Hour progress of one inscription against its tier's obligation.
#[derive(Debug, Clone, Serialize)]
pub struct HourTracking {
    /// Required hours for the semester (tier's `hours_per_semester`).
    pub total: i32,
    /// Hours tracked so far over live transactions.
    pub completed: i64,
    /// `max(total - completed, 0)`.
    pub remaining: i64,
}
