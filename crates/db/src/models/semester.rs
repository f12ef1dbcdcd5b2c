//! Semester entity model and DTOs.

use beca_core::types::{DateDay, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `semesters` table. `[start_date, end_date]` is inclusive
/// on both ends.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Semester {
    pub id: DbId,
    pub number: i32,
    pub year: i32,
    pub start_date: DateDay,
    pub end_date: DateDay,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new semester.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSemester {
    pub number: i32,
    pub year: i32,
    pub start_date: DateDay,
    pub end_date: DateDay,
}

/// DTO for updating an existing semester. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSemester {
    pub number: Option<i32>,
    pub year: Option<i32>,
    pub start_date: Option<DateDay>,
    pub end_date: Option<DateDay>,
}
