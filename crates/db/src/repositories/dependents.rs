//! Guard-chain dependent checks.
//!
//! An entity with live dependents cannot be tombstoned. The dependent
//! edges are a static map consulted check-then-act by every removal
//! operation before any mutation; the first edge with a non-zero live
//! count blocks the removal.

use beca_core::types::DbId;
use sqlx::PgPool;

/// One dependent edge: rows in `table` whose `fk_column` references the
/// guarded entity.
#[derive(Debug, Clone, Copy)]
pub struct DependentEdge {
    /// Human-readable dependent name used in error messages.
    pub dependent: &'static str,
    pub table: &'static str,
    pub fk_column: &'static str,
}

/// Entity types that guard their removal behind dependent checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Semester,
    Scholarship,
    ServiceDetail,
    Commitment,
    Inscription,
    Work,
}

impl Entity {
    /// Human-readable entity name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Entity::Semester => "semester",
            Entity::Scholarship => "scholarship",
            Entity::ServiceDetail => "service tier",
            Entity::Commitment => "commitment",
            Entity::Inscription => "inscription",
            Entity::Work => "work",
        }
    }

    /// The dependent edges that block this entity's removal.
    fn edges(self) -> &'static [DependentEdge] {
        match self {
            Entity::Semester => &[
                DependentEdge {
                    dependent: "inscription",
                    table: "inscriptions",
                    fk_column: "semester_id",
                },
                DependentEdge {
                    dependent: "work",
                    table: "works",
                    fk_column: "semester_id",
                },
            ],
            Entity::Scholarship => &[DependentEdge {
                dependent: "service tier",
                table: "service_details",
                fk_column: "scholarship_id",
            }],
            Entity::ServiceDetail => &[DependentEdge {
                dependent: "commitment",
                table: "commitments",
                fk_column: "service_details_id",
            }],
            Entity::Commitment => &[DependentEdge {
                dependent: "inscription",
                table: "inscriptions",
                fk_column: "commitment_id",
            }],
            Entity::Inscription => &[DependentEdge {
                dependent: "transaction",
                table: "transactions",
                fk_column: "inscription_id",
            }],
            Entity::Work => &[DependentEdge {
                dependent: "transaction",
                table: "transactions",
                fk_column: "work_id",
            }],
        }
    }
}

/// Provides live-dependent counting across entity tables.
pub struct DependentGuard;

impl DependentGuard {
    /// The first dependent edge with live rows referencing `id`, with its
    /// count. `None` means removal is unblocked.
    pub async fn first_blocking_dependent(
        pool: &PgPool,
        entity: Entity,
        id: DbId,
    ) -> Result<Option<(&'static str, i64)>, sqlx::Error> {
        for edge in entity.edges() {
            let count = Self::count_live_dependents(pool, edge, id).await?;
            if count > 0 {
                return Ok(Some((edge.dependent, count)));
            }
        }
        Ok(None)
    }

    /// Count live rows in one dependent table referencing `id`.
    async fn count_live_dependents(
        pool: &PgPool,
        edge: &DependentEdge,
        id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1 AND tombstoned = FALSE",
            edge.table, edge.fk_column
        );
        let count: (i64,) = sqlx::query_as(&sql).bind(id).fetch_one(pool).await?;
        Ok(count.0)
    }
}
