//! Repository for the `scholarships` and `service_details` tables.
//!
//! Tiers are owned by their scholarship, so both live in one repository,
//! matching how callers always reach a tier through its scholarship.

use beca_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::scholarship::{
    CreateScholarship, CreateServiceDetail, Scholarship, ServiceDetail, UpdateScholarship,
    UpdateServiceDetail,
};
use crate::pagination::Pagination;

/// Column list shared across scholarship queries.
const COLUMNS: &str = "id, name, description, tombstoned, created_at, updated_at";

/// Column list shared across service tier queries.
const TIER_COLUMNS: &str = "id, scholarship_id, percentage, hours_per_semester, \
    total_hours, tombstoned, created_at, updated_at";

/// Provides CRUD operations for scholarships and their service tiers.
pub struct ScholarshipRepo;

impl ScholarshipRepo {
    // ── Scholarships ─────────────────────────────────────────────────

    /// Insert a new scholarship, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScholarship,
    ) -> Result<Scholarship, sqlx::Error> {
        let query = format!(
            "INSERT INTO scholarships (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scholarship>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a scholarship by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scholarship>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM scholarships WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List scholarships matching `filter`, ordered by name.
    pub async fn list(
        pool: &PgPool,
        filter: &Filter,
        page: &Pagination,
    ) -> Result<Vec<Scholarship>, sqlx::Error> {
        let rendered = filter.live().render("s");
        let next = rendered.binds.len();
        let query = format!(
            "SELECT {COLUMNS} FROM scholarships s WHERE {} \
             ORDER BY s.name ASC LIMIT ${} OFFSET ${}",
            rendered.sql,
            next + 1,
            next + 2
        );
        let q = sqlx::query_as::<_, Scholarship>(&query);
        rendered
            .bind_to(q)
            .bind(page.clamped_limit())
            .bind(page.clamped_offset())
            .fetch_all(pool)
            .await
    }

    /// Count live scholarships matching `filter`.
    pub async fn count(pool: &PgPool, filter: &Filter) -> Result<i64, sqlx::Error> {
        let rendered = filter.live().render("s");
        let query = format!("SELECT COUNT(*) FROM scholarships s WHERE {}", rendered.sql);
        let q = sqlx::query_as::<_, (i64,)>(&query);
        let row = rendered.bind_to(q).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Update a scholarship. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScholarship,
    ) -> Result<Option<Scholarship>, sqlx::Error> {
        let query = format!(
            "UPDATE scholarships SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
             WHERE id = $1 AND tombstoned = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a scholarship by ID. Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scholarships SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Service tiers ────────────────────────────────────────────────

    /// Insert a new tier under a scholarship, returning the created row.
    pub async fn create_tier(
        pool: &PgPool,
        scholarship_id: DbId,
        input: &CreateServiceDetail,
    ) -> Result<ServiceDetail, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_details
                (scholarship_id, percentage, hours_per_semester, total_hours)
             VALUES ($1, $2, $3, $4)
             RETURNING {TIER_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceDetail>(&query)
            .bind(scholarship_id)
            .bind(input.percentage)
            .bind(input.hours_per_semester)
            .bind(input.total_hours)
            .fetch_one(pool)
            .await
    }

    /// Find a tier by its internal ID. Excludes tombstoned rows.
    pub async fn find_tier_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceDetail>, sqlx::Error> {
        let query =
            format!("SELECT {TIER_COLUMNS} FROM service_details WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, ServiceDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live tiers of a scholarship, ordered by percentage ascending.
    pub async fn list_tiers(
        pool: &PgPool,
        scholarship_id: DbId,
    ) -> Result<Vec<ServiceDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {TIER_COLUMNS} FROM service_details
             WHERE scholarship_id = $1 AND tombstoned = FALSE
             ORDER BY percentage ASC"
        );
        sqlx::query_as::<_, ServiceDetail>(&query)
            .bind(scholarship_id)
            .fetch_all(pool)
            .await
    }

    /// Find the live tier of a scholarship carrying `percentage`, optionally
    /// excluding one row (for updates comparing against peers).
    pub async fn find_tier_by_percentage(
        pool: &PgPool,
        scholarship_id: DbId,
        percentage: f64,
        exclude_id: Option<DbId>,
    ) -> Result<Option<ServiceDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {TIER_COLUMNS} FROM service_details
             WHERE scholarship_id = $1
               AND percentage = $2
               AND tombstoned = FALSE
               AND ($3::BIGINT IS NULL OR id <> $3)"
        );
        sqlx::query_as::<_, ServiceDetail>(&query)
            .bind(scholarship_id)
            .bind(percentage)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a tier. Only non-`None` fields in `input` are applied.
    pub async fn update_tier(
        pool: &PgPool,
        id: DbId,
        input: &UpdateServiceDetail,
    ) -> Result<Option<ServiceDetail>, sqlx::Error> {
        let query = format!(
            "UPDATE service_details SET
                percentage = COALESCE($2, percentage),
                hours_per_semester = COALESCE($3, hours_per_semester),
                total_hours = COALESCE($4, total_hours),
                updated_at = NOW()
             WHERE id = $1 AND tombstoned = FALSE
             RETURNING {TIER_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceDetail>(&query)
            .bind(id)
            .bind(input.percentage)
            .bind(input.hours_per_semester)
            .bind(input.total_hours)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a tier by ID. Returns `true` if a live row was marked.
    pub async fn tombstone_tier(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_details SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
