//! Hour-transaction log: the append-only record that drives completion.

use beca_core::error::DomainError;
use beca_core::types::DbId;
use beca_db::filter::Filter;
use beca_db::models::transaction::{CreateTransaction, Transaction};
use beca_db::pagination::{Paginated, Pagination};
use beca_db::repositories::{InscriptionRepo, TransactionRepo, WorkRepo};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::EngineResult;

/// Optional narrowing criteria for transaction listings. Filtering by
/// semester reaches through the referenced work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub inscription_id: Option<DbId>,
    pub work_id: Option<DbId>,
    pub semester_id: Option<DbId>,
}

impl TransactionQuery {
    fn to_filter(&self) -> Filter {
        let mut branches = Vec::new();
        if let Some(id) = self.inscription_id {
            branches.push(Filter::eq("inscription_id", id));
        }
        if let Some(id) = self.work_id {
            branches.push(Filter::eq("work_id", id));
        }
        if let Some(id) = self.semester_id {
            branches.push(Filter::relation(
                "works",
                "work_id",
                "id",
                Filter::eq("semester_id", id),
            ));
        }
        Filter::And(branches)
    }
}

/// Records administrator-logged hour credits and keeps the owning
/// inscription's completion flag consistent with the ledger.
pub struct TransactionLog {
    pool: PgPool,
}

impl TransactionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an hour credit. The referenced work and inscription must be
    /// live and belong to the same semester; the inscription's completion
    /// flag is recomputed in the same database transaction as the insert.
    pub async fn create(&self, input: CreateTransaction) -> EngineResult<Transaction> {
        if input.hours <= 0 {
            return Err(DomainError::Validation("Hours must be positive".to_string()).into());
        }

        let work = WorkRepo::find_by_id(&self.pool, input.work_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "work",
                id: input.work_id,
            })?;
        let inscription = InscriptionRepo::find_by_id(&self.pool, input.inscription_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "inscription",
                id: input.inscription_id,
            })?;

        if work.semester_id != inscription.semester_id {
            return Err(DomainError::Validation(
                "Work and inscription belong to different semesters".to_string(),
            )
            .into());
        }

        let created = TransactionRepo::create(&self.pool, &input).await?;
        tracing::info!(
            transaction_id = created.id,
            inscription_id = created.inscription_id,
            hours = created.hours,
            "hour transaction recorded"
        );
        Ok(created)
    }

    /// Tombstone an hour transaction. The inscription's hour total shrinks,
    /// which may revert its completion flag in the same database
    /// transaction.
    pub async fn remove(&self, id: DbId) -> EngineResult<()> {
        if !TransactionRepo::tombstone(&self.pool, id).await? {
            return Err(DomainError::NotFound {
                entity: "transaction",
                id,
            }
            .into());
        }
        tracing::info!(transaction_id = id, "hour transaction tombstoned");
        Ok(())
    }

    /// Find a live transaction by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Transaction> {
        TransactionRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "transaction",
                    id,
                }
                .into()
            })
    }

    /// List live transactions matching `query`, newest first, paginated.
    pub async fn list(
        &self,
        query: &TransactionQuery,
        page: &Pagination,
    ) -> EngineResult<Paginated<Transaction>> {
        let filter = query.to_filter();
        let data = TransactionRepo::list(&self.pool, &filter, page).await?;
        let total = TransactionRepo::count(&self.pool, &filter).await?;
        Ok(Paginated {
            data,
            total,
            limit: page.clamped_limit(),
            offset: page.clamped_offset(),
        })
    }

    /// Total live hours recorded against an inscription.
    pub async fn total_for_inscription(&self, inscription_id: DbId) -> EngineResult<i64> {
        Ok(TransactionRepo::total_hours_for_inscription(&self.pool, inscription_id).await?)
    }

    /// Set the student comment on a transaction, once. Only the student the
    /// transaction belongs to (through its inscription's commitment) may
    /// write it.
    pub async fn add_student_comment(
        &self,
        id: DbId,
        student_id: DbId,
        comment: &str,
    ) -> EngineResult<Transaction> {
        let existing = self.find(id).await?;

        let owner = TransactionRepo::find_student_for_transaction(&self.pool, id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "transaction",
                id,
            })?;
        if owner != student_id {
            return Err(DomainError::Validation(
                "Transaction does not belong to this student".to_string(),
            )
            .into());
        }

        if existing.comment_student.is_some() {
            return Err(
                DomainError::Validation("Transaction already has a student comment".to_string())
                    .into(),
            );
        }

        let trimmed = comment.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation("Comment must not be empty".to_string()).into());
        }

        // The update is guarded on the comment still being absent; losing
        // a write race must surface, not hand back the other writer's
        // comment as if it were this one.
        if !TransactionRepo::add_student_comment(&self.pool, id, trimmed).await? {
            return Err(
                DomainError::Validation("Transaction already has a student comment".to_string())
                    .into(),
            );
        }
        self.find(id).await
    }
}
