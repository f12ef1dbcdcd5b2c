//! Repository for the `inscriptions` table, including the completion
//! recomputation shared by every write that changes an inscription's hour
//! total or hour target.

use beca_core::completion;
use beca_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::inscription::{Inscription, InscriptionDetail};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, commitment_id, semester_id, is_complete, \
    tombstoned, created_at, updated_at";

/// An inscription's identity plus the hour target it is measured against.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackingTarget {
    pub inscription_id: DbId,
    pub hours_per_semester: i32,
}

/// Provides CRUD, lookup, and completion-recomputation operations for
/// inscriptions.
pub struct InscriptionRepo;

impl InscriptionRepo {
    /// Insert a new inscription for a commitment/semester pair, starting
    /// incomplete. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        commitment_id: DbId,
        semester_id: DbId,
    ) -> Result<Inscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO inscriptions (commitment_id, semester_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inscription>(&query)
            .bind(commitment_id)
            .bind(semester_id)
            .fetch_one(pool)
            .await
    }

    /// Find an inscription by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Inscription>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM inscriptions WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Inscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The unique live inscription for a commitment/semester pair, if any.
    pub async fn find_by_pair(
        pool: &PgPool,
        commitment_id: DbId,
        semester_id: DbId,
    ) -> Result<Option<Inscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inscriptions
             WHERE commitment_id = $1 AND semester_id = $2 AND tombstoned = FALSE"
        );
        sqlx::query_as::<_, Inscription>(&query)
            .bind(commitment_id)
            .bind(semester_id)
            .fetch_optional(pool)
            .await
    }

    /// The student's live inscription in a semester (through any of their
    /// commitments), with the hour target of the commitment's tier.
    pub async fn find_tracking_target(
        pool: &PgPool,
        student_id: DbId,
        semester_id: DbId,
    ) -> Result<Option<TrackingTarget>, sqlx::Error> {
        sqlx::query_as::<_, TrackingTarget>(
            "SELECT i.id AS inscription_id, sd.hours_per_semester
             FROM inscriptions i
             JOIN commitments c ON c.id = i.commitment_id
             JOIN service_details sd ON sd.id = c.service_details_id
             WHERE c.student_id = $1
               AND i.semester_id = $2
               AND i.tombstoned = FALSE
               AND c.tombstoned = FALSE",
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_optional(pool)
        .await
    }

    /// Live inscriptions of a student within a calendar year, joined with
    /// semester and tier context, most recent first.
    pub async fn list_by_student_and_year(
        pool: &PgPool,
        student_id: DbId,
        year: i32,
    ) -> Result<Vec<InscriptionDetail>, sqlx::Error> {
        sqlx::query_as::<_, InscriptionDetail>(
            "SELECT i.id, i.commitment_id, i.semester_id,
                    sem.number AS semester_number, sem.year AS semester_year,
                    s.name AS scholarship, sd.percentage,
                    i.is_complete, i.created_at
             FROM inscriptions i
             JOIN semesters sem ON sem.id = i.semester_id
             JOIN commitments c ON c.id = i.commitment_id
             JOIN service_details sd ON sd.id = c.service_details_id
             JOIN scholarships s ON s.id = sd.scholarship_id
             WHERE c.student_id = $1
               AND sem.year = $2
               AND i.tombstoned = FALSE
             ORDER BY i.created_at DESC",
        )
        .bind(student_id)
        .bind(year)
        .fetch_all(pool)
        .await
    }

    /// Take the inscription's row lock as its own statement, before any
    /// write that triggers recomputation.
    ///
    /// Every writer on the hour path (transaction insert/tombstone,
    /// commitment reassignment) must acquire this lock as the
    /// transaction's first statement. Uniform lock-first ordering avoids
    /// the deadlock between the FK key-share a transaction insert takes on
    /// the inscription row and a later `FOR UPDATE`, and guarantees that
    /// statements running after a lock wait observe every row committed in
    /// the meantime.
    pub(crate) async fn lock_for_recompute(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1 FROM inscriptions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Move an inscription to a different commitment and recompute its
    /// completion flag against the new commitment's hour target, in one
    /// transaction.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn reassign_commitment(
        pool: &PgPool,
        id: DbId,
        new_commitment_id: DbId,
    ) -> Result<Option<Inscription>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_for_recompute(&mut *tx, id).await?;

        let query = format!(
            "UPDATE inscriptions SET commitment_id = $2, updated_at = NOW()
             WHERE id = $1 AND tombstoned = FALSE
             RETURNING {COLUMNS}"
        );
        let moved = sqlx::query_as::<_, Inscription>(&query)
            .bind(id)
            .bind(new_commitment_id)
            .fetch_optional(&mut *tx)
            .await?;

        if moved.is_none() {
            return Ok(None);
        }

        Self::recompute_completion(&mut *tx, id).await?;

        // Re-read inside the transaction so the returned row carries the
        // recomputed flag.
        let refresh = format!("SELECT {COLUMNS} FROM inscriptions WHERE id = $1");
        let refreshed = sqlx::query_as::<_, Inscription>(&refresh)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(refreshed))
    }

    /// Tombstone an inscription by ID. Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE inscriptions SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute an inscription's completion flag from its live hour total.
    ///
    /// Runs on the caller's open transaction. The inscription row lock is
    /// taken in its own statement first (a no-op re-entry when the caller
    /// already holds it via [`Self::lock_for_recompute`]); the aggregate
    /// then runs as a subsequent statement, whose read-committed snapshot
    /// is taken after any lock wait and therefore counts hours committed
    /// while blocked. Tracked hours are summed directly over the
    /// transaction rows' `inscription_id`; the flag is updated only when
    /// the pure transition says it changed. Idempotent and infallible
    /// beyond storage errors.
    ///
    /// Returns the new flag value when a transition happened.
    pub async fn recompute_completion(
        conn: &mut PgConnection,
        inscription_id: DbId,
    ) -> Result<Option<bool>, sqlx::Error> {
        let locked: Option<(bool,)> =
            sqlx::query_as("SELECT is_complete FROM inscriptions WHERE id = $1 FOR UPDATE")
                .bind(inscription_id)
                .fetch_optional(&mut *conn)
                .await?;

        // An unknown inscription is a no-op, not an error: recomputation
        // must be safe to call redundantly.
        let Some((is_complete,)) = locked else {
            return Ok(None);
        };

        let (required, tracked): (i32, i64) = sqlx::query_as(
            "SELECT sd.hours_per_semester,
                    COALESCE((SELECT SUM(t.hours)::BIGINT FROM transactions t
                              WHERE t.inscription_id = i.id AND t.tombstoned = FALSE), 0)
             FROM inscriptions i
             JOIN commitments c ON c.id = i.commitment_id
             JOIN service_details sd ON sd.id = c.service_details_id
             WHERE i.id = $1",
        )
        .bind(inscription_id)
        .fetch_one(&mut *conn)
        .await?;

        let Some(new_flag) = completion::next_state(tracked, required, is_complete) else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE inscriptions SET is_complete = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(inscription_id)
        .bind(new_flag)
        .execute(&mut *conn)
        .await?;

        tracing::info!(
            inscription_id,
            is_complete = new_flag,
            tracked,
            required,
            "inscription completion state changed"
        );
        Ok(Some(new_flag))
    }
}
