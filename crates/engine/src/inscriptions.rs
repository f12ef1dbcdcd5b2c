//! Inscription tracker: per-semester enrollment of commitments.

use beca_core::error::DomainError;
use beca_core::types::DbId;
use beca_db::models::inscription::{HourTracking, Inscription, InscriptionDetail};
use beca_db::repositories::{
    CommitmentRepo, Entity, InscriptionRepo, SemesterRepo, TransactionRepo,
};
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::guard;

/// Binds commitments to semesters, one live inscription per pair, and
/// exposes the derived hour/completion state.
pub struct InscriptionTracker {
    pool: PgPool,
}

impl InscriptionTracker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a commitment in a semester. Rejected when a live inscription
    /// already exists for the pair; starts incomplete.
    pub async fn enroll(&self, commitment_id: DbId, semester_id: DbId) -> EngineResult<Inscription> {
        CommitmentRepo::find_by_id(&self.pool, commitment_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "commitment",
                id: commitment_id,
            })?;
        SemesterRepo::find_by_id(&self.pool, semester_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "semester",
                id: semester_id,
            })?;

        if InscriptionRepo::find_by_pair(&self.pool, commitment_id, semester_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyEnrolled {
                commitment_id,
                semester_id,
            }
            .into());
        }

        let created = InscriptionRepo::create(&self.pool, commitment_id, semester_id).await?;
        tracing::info!(
            inscription_id = created.id,
            commitment_id,
            semester_id,
            "inscription created"
        );
        Ok(created)
    }

    /// Tombstone an inscription. Blocked while any live transaction
    /// references it.
    pub async fn unenroll(&self, inscription_id: DbId) -> EngineResult<()> {
        self.find(inscription_id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::Inscription, inscription_id).await?;
        InscriptionRepo::tombstone(&self.pool, inscription_id).await?;
        tracing::info!(inscription_id, "inscription tombstoned");
        Ok(())
    }

    /// Move an inscription to a different commitment (a student's tier
    /// changed mid-term). The completion flag is recomputed against the new
    /// commitment's hour target inside the same transaction, since the
    /// target changes with the tier.
    pub async fn reassign_commitment(
        &self,
        inscription_id: DbId,
        new_commitment_id: DbId,
    ) -> EngineResult<Inscription> {
        let inscription = self.find(inscription_id).await?;
        CommitmentRepo::find_by_id(&self.pool, new_commitment_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "commitment",
                id: new_commitment_id,
            })?;

        // The move must not collide with an existing live enrollment of the
        // target commitment in the same semester.
        if let Some(existing) =
            InscriptionRepo::find_by_pair(&self.pool, new_commitment_id, inscription.semester_id)
                .await?
        {
            if existing.id != inscription_id {
                return Err(DomainError::AlreadyEnrolled {
                    commitment_id: new_commitment_id,
                    semester_id: inscription.semester_id,
                }
                .into());
            }
        }

        match InscriptionRepo::reassign_commitment(&self.pool, inscription_id, new_commitment_id)
            .await?
        {
            Some(moved) => Ok(moved),
            None => Err(DomainError::NotFound {
                entity: "inscription",
                id: inscription_id,
            }
            .into()),
        }
    }

    /// Find a live inscription by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Inscription> {
        InscriptionRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "inscription",
                    id,
                }
                .into()
            })
    }

    /// Total live hours tracked against an inscription (0 if none).
    pub async fn get_hours(&self, inscription_id: DbId) -> EngineResult<i64> {
        self.find(inscription_id).await?;
        Ok(TransactionRepo::total_hours_for_inscription(&self.pool, inscription_id).await?)
    }

    /// Live inscriptions of a student within a calendar year, with
    /// semester and tier context.
    pub async fn find_by_student_and_year(
        &self,
        student_id: DbId,
        year: i32,
    ) -> EngineResult<Vec<InscriptionDetail>> {
        Ok(InscriptionRepo::list_by_student_and_year(&self.pool, student_id, year).await?)
    }

    /// Hour progress of a student's inscription in one semester:
    /// `{ total, completed, remaining }` against the commitment tier's
    /// hour target.
    pub async fn tracking_for_semester(
        &self,
        student_id: DbId,
        semester_id: DbId,
    ) -> EngineResult<HourTracking> {
        let target = InscriptionRepo::find_tracking_target(&self.pool, student_id, semester_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "inscription",
                id: semester_id,
            })?;

        let completed =
            TransactionRepo::total_hours_for_inscription(&self.pool, target.inscription_id)
                .await?;
        let total = target.hours_per_semester;
        Ok(HourTracking {
            total,
            completed,
            remaining: (i64::from(total) - completed).max(0),
        })
    }
}
