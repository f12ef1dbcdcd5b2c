//! Repository for the `transactions` table.
//!
//! Hour transactions are logically append-only: creation and tombstoning
//! both run the owning inscription's completion recomputation inside the
//! same transaction as the write, so a reader never observes an hour total
//! and a completion flag that disagree.

use beca_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::transaction::{CreateTransaction, Transaction};
use crate::pagination::Pagination;
use crate::repositories::InscriptionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, date, hours, comment_student, comment_administrative, \
    work_id, inscription_id, author_id, tombstoned, created_at, updated_at";

/// Provides append, tombstone, and aggregate operations for hour
/// transactions.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a new hour transaction and recompute the owning inscription's
    /// completion flag, in one transaction.
    ///
    /// The inscription row lock is taken before the insert: the insert's FK
    /// check takes a key-share on that row, and acquiring the full lock
    /// first keeps concurrent writers in one uniform lock order.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let mut tx = pool.begin().await?;
        InscriptionRepo::lock_for_recompute(&mut *tx, input.inscription_id).await?;

        let query = format!(
            "INSERT INTO transactions
                (date, hours, comment_student, comment_administrative,
                 work_id, inscription_id, author_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Transaction>(&query)
            .bind(input.date)
            .bind(input.hours)
            .bind(&input.comment_student)
            .bind(&input.comment_administrative)
            .bind(input.work_id)
            .bind(input.inscription_id)
            .bind(input.author_id)
            .fetch_one(&mut *tx)
            .await?;

        InscriptionRepo::recompute_completion(&mut *tx, created.inscription_id).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Find a transaction by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM transactions WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List transactions matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &Filter,
        page: &Pagination,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rendered = filter.live().render("t");
        let next = rendered.binds.len();
        let query = format!(
            "SELECT {COLUMNS} FROM transactions t WHERE {} \
             ORDER BY t.created_at DESC LIMIT ${} OFFSET ${}",
            rendered.sql,
            next + 1,
            next + 2
        );
        let q = sqlx::query_as::<_, Transaction>(&query);
        rendered
            .bind_to(q)
            .bind(page.clamped_limit())
            .bind(page.clamped_offset())
            .fetch_all(pool)
            .await
    }

    /// Count live transactions matching `filter`.
    pub async fn count(pool: &PgPool, filter: &Filter) -> Result<i64, sqlx::Error> {
        let rendered = filter.live().render("t");
        let query = format!("SELECT COUNT(*) FROM transactions t WHERE {}", rendered.sql);
        let q = sqlx::query_as::<_, (i64,)>(&query);
        let row = rendered.bind_to(q).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// Total live hours tracked against an inscription (0 if none).
    pub async fn total_hours_for_inscription(
        pool: &PgPool,
        inscription_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(hours)::BIGINT, 0) FROM transactions \
             WHERE inscription_id = $1 AND tombstoned = FALSE",
        )
        .bind(inscription_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Tombstone a transaction and recompute the owning inscription's
    /// completion flag, in one transaction. The hour total may fall below
    /// the target, reverting a completed inscription.
    ///
    /// The owning inscription's row lock is taken before the mark, in the
    /// same lock order every hour writer uses.
    ///
    /// Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let target: Option<(DbId,)> = sqlx::query_as(
            "SELECT inscription_id FROM transactions WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((inscription_id,)) = target else {
            return Ok(false);
        };

        InscriptionRepo::lock_for_recompute(&mut *tx, inscription_id).await?;

        let result = sqlx::query(
            "UPDATE transactions SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        // The pre-lock read was unlocked: a concurrent tombstone may have
        // marked the row while we waited.
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        InscriptionRepo::recompute_completion(&mut *tx, inscription_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Set the student comment on a transaction. One-shot: the engine only
    /// calls this when no comment exists yet. Returns `true` if applied.
    pub async fn add_student_comment(
        pool: &PgPool,
        id: DbId,
        comment: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET comment_student = $2, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE AND comment_student IS NULL",
        )
        .bind(id)
        .bind(comment)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The student a transaction ultimately belongs to, through its
    /// inscription's commitment. Used for comment-authorship checks.
    pub async fn find_student_for_transaction(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT c.student_id
             FROM transactions t
             JOIN inscriptions i ON i.id = t.inscription_id
             JOIN commitments c ON c.id = i.commitment_id
             WHERE t.id = $1 AND t.tombstoned = FALSE",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(student_id,)| student_id))
    }
}
