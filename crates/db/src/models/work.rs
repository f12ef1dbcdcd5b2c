//! Work-assignment entity model and DTOs.

use beca_core::types::{DateDay, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `works` table. The work window must fall inside the
/// bounds of the referenced semester.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Work {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub date_begin: DateDay,
    pub date_end: DateDay,
    pub administrative_id: DbId,
    pub semester_id: DbId,
    pub is_open: bool,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new work. `administrative_id` comes from the external
/// auth layer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWork {
    pub title: String,
    pub description: String,
    pub date_begin: DateDay,
    pub date_end: DateDay,
    pub administrative_id: DbId,
    pub semester_id: DbId,
    /// Defaults to open if omitted.
    pub is_open: Option<bool>,
}

/// DTO for updating an existing work. The owning semester is immutable;
/// all other fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWork {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_begin: Option<DateDay>,
    pub date_end: Option<DateDay>,
    pub is_open: Option<bool>,
}
