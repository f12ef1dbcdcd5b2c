//! Repository for the `commitments` table.

use beca_core::types::DbId;
use sqlx::PgPool;

use crate::models::commitment::{AssignOutcome, Commitment, CommitmentSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, service_details_id, is_current, \
    tombstoned, created_at, updated_at";

/// Provides CRUD and current-flip operations for commitments.
pub struct CommitmentRepo;

impl CommitmentRepo {
    /// Make `service_details_id` the student's current commitment.
    ///
    /// One transaction: the previous current commitment (if any) is flipped
    /// off and returned alongside the newly inserted current one, so both
    /// steps are observed together. The flip's `UPDATE` takes a row lock on
    /// the student's current commitment, serializing concurrent assigns for
    /// the same student; the partial unique index on
    /// `(student_id) WHERE is_current AND NOT tombstoned` backs the case
    /// where no previous row exists to lock.
    pub async fn assign_current(
        pool: &PgPool,
        student_id: DbId,
        service_details_id: DbId,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let flip = format!(
            "UPDATE commitments SET is_current = FALSE, updated_at = NOW()
             WHERE student_id = $1 AND is_current = TRUE AND tombstoned = FALSE
             RETURNING {COLUMNS}"
        );
        let superseded = sqlx::query_as::<_, Commitment>(&flip)
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO commitments (student_id, service_details_id, is_current)
             VALUES ($1, $2, TRUE)
             RETURNING {COLUMNS}"
        );
        let current = sqlx::query_as::<_, Commitment>(&insert)
            .bind(student_id)
            .bind(service_details_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AssignOutcome {
            superseded,
            current,
        })
    }

    /// Find a commitment by its internal ID. Excludes tombstoned rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Commitment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM commitments WHERE id = $1 AND tombstoned = FALSE");
        sqlx::query_as::<_, Commitment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The student's unique live current commitment, if any.
    pub async fn find_current(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<Commitment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commitments
             WHERE student_id = $1 AND is_current = TRUE AND tombstoned = FALSE"
        );
        sqlx::query_as::<_, Commitment>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// All live commitments of a student with tier and scholarship context,
    /// newest first.
    pub async fn list_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<CommitmentSummary>, sqlx::Error> {
        sqlx::query_as::<_, CommitmentSummary>(
            "SELECT c.id, c.is_current, s.name AS scholarship,
                    sd.percentage, sd.hours_per_semester
             FROM commitments c
             JOIN service_details sd ON sd.id = c.service_details_id
             JOIN scholarships s ON s.id = sd.scholarship_id
             WHERE c.student_id = $1 AND c.tombstoned = FALSE
             ORDER BY c.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Tombstone a commitment by ID. Returns `true` if a live row was marked.
    pub async fn tombstone(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE commitments SET tombstoned = TRUE, updated_at = NOW() \
             WHERE id = $1 AND tombstoned = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
