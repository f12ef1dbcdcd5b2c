//! Hour-transaction entity model and DTOs.

use beca_core::types::{DateDay, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `transactions` table: one hour-credit entry logged by an
/// administrator against an inscription for a specific work assignment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub date: DateDay,
    pub hours: i32,
    pub comment_student: Option<String>,
    pub comment_administrative: String,
    pub work_id: DbId,
    pub inscription_id: DbId,
    pub author_id: DbId,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new hour transaction. `author_id` is the acting
/// administrator, supplied by the external auth layer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub date: DateDay,
    pub hours: i32,
    pub comment_student: Option<String>,
    pub comment_administrative: String,
    pub work_id: DbId,
    pub inscription_id: DbId,
    pub author_id: DbId,
}
