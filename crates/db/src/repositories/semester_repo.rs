//! Repository for the `semesters` table.

use beca_core::types::{DateDay, DbId};
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::semester::{CreateSemester, Semester, UpdateSemester};
use crate::pagination::Pagination;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, number, year, start_date, end_date, \
    tombstoned, created_at, updated_at";

/// Provides CRUD operations for semesters.
pub struct SemesterRepo;

impl SemesterRepo {
    /// Insert a new semester, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSemester) -> Result<Semester, sqlx::Error> {
        let query = format!(
            "INSERT INTO semesters (number, year, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(input.number)
            .bind(input.year)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a semester by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM semesters WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List semesters matching `filter`, newest start date first. The
    /// filter is rewritten to live rows before rendering.
    pub async fn list(
        pool: &PgPool,
        filter: &Filter,
        page: &Pagination,
    ) -> Result<Vec<Semester>, sqlx::Error> {
        let rendered = filter.live().render("s");
        let next = rendered.binds.len();
        let query = format!(
            "SELECT {COLUMNS} FROM semesters s WHERE {} \
             ORDER BY s.start_date DESC LIMIT ${} OFFSET ${}",
            rendered.sql,
            next + 1,
            next + 2
        );
        let q = sqlx::query_as::<_, Semester>(&query);
        rendered
            .bind_to(q)
            .bind(page.clamped_limit())
            .bind(page.clamped_offset())
            .fetch_all(pool)
            .await
    }

    /// Count live semesters matching `filter`.
    pub async fn count(pool: &PgPool, filter: &Filter) -> Result<i64, sqlx::Error> {
        let rendered = filter.live().render("s");
        let query = format!("SELECT COUNT(*) FROM semesters s WHERE {}", rendered.sql);
        let q = sqlx::query_as::<_, (i64,)>(&query);
        let row = rendered.bind_to(q).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Live semesters whose inclusive interval intersects `[start, end]`,
    /// optionally excluding one row (for updates comparing against peers).
    pub async fn find_overlapping(
        pool: &PgPool,
        start: DateDay,
        end: DateDay,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<Semester>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM semesters
             WHERE tombstoned = FALSE
               AND start_date <= $2
               AND end_date >= $1
               AND ($3::BIGINT IS NULL OR id <> $3)
             ORDER BY start_date ASC"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(start)
            .bind(end)
            .bind(exclude_id)
            .fetch_all(pool)
            .await
    }

    /// Update a semester. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSemester,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!(
            "UPDATE semesters SET
                number = COALESCE($2, number),
                year = COALESCE($3, year),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = NOW()
             WHERE id = $1 AND tombstoned = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(input.number)
            .bind(input.year)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a semester by ID. Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE semesters SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
