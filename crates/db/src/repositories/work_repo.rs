//! Repository for the `works` table.

use beca_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::work::{CreateWork, UpdateWork, Work};
use crate::pagination::Pagination;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, date_begin, date_end, \
    administrative_id, semester_id, is_open, tombstoned, created_at, updated_at";

/// Provides CRUD operations for work assignments.
pub struct WorkRepo;

impl WorkRepo {
    /// Insert a new work, returning the created row.
    ///
    /// If `is_open` is `None`, defaults to `true`.
    pub async fn create(pool: &PgPool, input: &CreateWork) -> Result<Work, sqlx::Error> {
        let query = format!(
            "INSERT INTO works
                (title, description, date_begin, date_end,
                 administrative_id, semester_id, is_open)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Work>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.date_begin)
            .bind(input.date_end)
            .bind(input.administrative_id)
            .bind(input.semester_id)
            .bind(input.is_open)
            .fetch_one(pool)
            .await
    }

    /// Find a work by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Work>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM works WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Work>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List works matching `filter`, most recent window first.
    pub async fn list(
        pool: &PgPool,
        filter: &Filter,
        page: &Pagination,
    ) -> Result<Vec<Work>, sqlx::Error> {
        let rendered = filter.live().render("w");
        let next = rendered.binds.len();
        let query = format!(
            "SELECT {COLUMNS} FROM works w WHERE {} \
             ORDER BY w.date_begin DESC LIMIT ${} OFFSET ${}",
            rendered.sql,
            next + 1,
            next + 2
        );
        let q = sqlx::query_as::<_, Work>(&query);
        rendered
            .bind_to(q)
            .bind(page.clamped_limit())
            .bind(page.clamped_offset())
            .fetch_all(pool)
            .await
    }

    /// Count live works matching `filter`.
    pub async fn count(pool: &PgPool, filter: &Filter) -> Result<i64, sqlx::Error> {
        let rendered = filter.live().render("w");
        let query = format!("SELECT COUNT(*) FROM works w WHERE {}", rendered.sql);
        let q = sqlx::query_as::<_, (i64,)>(&query);
        let row = rendered.bind_to(q).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Update a work. Only non-`None` fields in `input` are applied; the
    /// owning semester cannot change.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWork,
    ) -> Result<Option<Work>, sqlx::Error> {
        let query = format!(
            "UPDATE works SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                date_begin = COALESCE($4, date_begin),
                date_end = COALESCE($5, date_end),
                is_open = COALESCE($6, is_open),
                updated_at = NOW()
             WHERE id = $1 AND tombstoned = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Work>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.date_begin)
            .bind(input.date_end)
            .bind(input.is_open)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a work by ID. Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE works SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
