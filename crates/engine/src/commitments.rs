//! Commitment ledger: a student's binding to one current service tier.

use beca_core::error::DomainError;
use beca_core::types::DbId;
use beca_db::models::commitment::{AssignOutcome, Commitment, CommitmentSummary};
use beca_db::repositories::{CommitmentRepo, Entity, ScholarshipRepo};
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::guard;

/// Binds students to service tiers. At most one live commitment per
/// student is current at any instant; assignment supersedes the previous
/// current commitment atomically.
pub struct CommitmentLedger {
    pool: PgPool,
}

impl CommitmentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Make `service_details_id` the student's current commitment,
    /// superseding any existing current one in the same transaction.
    ///
    /// The returned outcome carries both the new current commitment and
    /// the superseded one, so callers never reconstruct the flip from two
    /// observations. Re-assigning the tier the student already holds as
    /// current is rejected.
    pub async fn assign(
        &self,
        student_id: DbId,
        service_details_id: DbId,
    ) -> EngineResult<AssignOutcome> {
        let tier = ScholarshipRepo::find_tier_by_id(&self.pool, service_details_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "service tier",
                id: service_details_id,
            })?;

        if let Some(current) = CommitmentRepo::find_current(&self.pool, student_id).await? {
            if current.service_details_id == tier.id {
                return Err(DomainError::Validation(
                    "Student already holds this service tier as the current commitment"
                        .to_string(),
                )
                .into());
            }
        }

        let outcome = CommitmentRepo::assign_current(&self.pool, student_id, tier.id).await?;
        tracing::info!(
            student_id,
            commitment_id = outcome.current.id,
            superseded_id = outcome.superseded.as_ref().map(|c| c.id),
            "commitment assigned"
        );
        Ok(outcome)
    }

    /// The student's unique live current commitment.
    pub async fn find_current(&self, student_id: DbId) -> EngineResult<Commitment> {
        CommitmentRepo::find_current(&self.pool, student_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "current commitment",
                    id: student_id,
                }
                .into()
            })
    }

    /// Find a live commitment by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Commitment> {
        CommitmentRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "commitment",
                    id,
                }
                .into()
            })
    }

    /// All live commitments of a student with tier and scholarship
    /// context, newest first.
    pub async fn list_by_student(&self, student_id: DbId) -> EngineResult<Vec<CommitmentSummary>> {
        Ok(CommitmentRepo::list_by_student(&self.pool, student_id).await?)
    }

    /// Tombstone a commitment. Blocked while any live inscription
    /// references it.
    pub async fn remove(&self, id: DbId) -> EngineResult<()> {
        self.find(id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::Commitment, id).await?;
        CommitmentRepo::tombstone(&self.pool, id).await?;
        tracing::info!(commitment_id = id, "commitment tombstoned");
        Ok(())
    }
}
