//! Shared guard-chain check used by every removal operation.

use beca_core::error::DomainError;
use beca_core::types::DbId;
use beca_db::repositories::{DependentGuard, Entity};
use sqlx::PgPool;

use crate::error::EngineResult;

/// Reject with `HasDependents` if any live dependent still references the
/// entity. Called before the tombstone mutation (check-then-act).
pub(crate) async fn ensure_no_live_dependents(
    pool: &PgPool,
    entity: Entity,
    id: DbId,
) -> EngineResult<()> {
    if let Some((dependent, count)) =
        DependentGuard::first_blocking_dependent(pool, entity, id).await?
    {
        tracing::debug!(
            entity = entity.name(),
            id,
            dependent,
            count,
            "removal blocked by live dependents"
        );
        return Err(DomainError::HasDependents {
            entity: entity.name(),
            dependent,
            count,
        }
        .into());
    }
    Ok(())
}
