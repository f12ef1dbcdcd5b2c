//! Scholarship and service-tier entity models and DTOs.

use beca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `scholarships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scholarship {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new scholarship.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScholarship {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing scholarship. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScholarship {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A row from the `service_details` table: one coverage tier of a
/// scholarship. `percentage` lies in (0, 1]; live tiers of the same
/// scholarship carry distinct percentages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceDetail {
    pub id: DbId,
    pub scholarship_id: DbId,
    pub percentage: f64,
    pub hours_per_semester: i32,
    pub total_hours: i32,
    pub tombstoned: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new service tier. The owning scholarship id is
/// supplied separately by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceDetail {
    pub percentage: f64,
    pub hours_per_semester: i32,
    pub total_hours: i32,
}

/// DTO for updating an existing service tier. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceDetail {
    pub percentage: Option<f64>,
    pub hours_per_semester: Option<i32>,
    pub total_hours: Option<i32>,
}
