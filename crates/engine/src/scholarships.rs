//! Scholarship catalog: scholarships and their service tiers.

use beca_core::error::DomainError;
use beca_core::types::DbId;
use beca_db::filter::Filter;
use beca_db::models::scholarship::{
    CreateScholarship, CreateServiceDetail, Scholarship, ServiceDetail, UpdateScholarship,
    UpdateServiceDetail,
};
use beca_db::pagination::{Paginated, Pagination};
use beca_db::repositories::{Entity, ScholarshipRepo};
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::guard;

/// Owns scholarships and their percentage/hour service tiers. Live tiers of
/// one scholarship carry pairwise distinct percentages.
pub struct ScholarshipCatalog {
    pool: PgPool,
}

impl ScholarshipCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ── Scholarships ─────────────────────────────────────────────────

    pub async fn create(&self, input: CreateScholarship) -> EngineResult<Scholarship> {
        let created = ScholarshipRepo::create(&self.pool, &input).await?;
        tracing::info!(scholarship_id = created.id, "scholarship created");
        Ok(created)
    }

    /// Find a live scholarship by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Scholarship> {
        ScholarshipRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "scholarship",
                    id,
                }
                .into()
            })
    }

    /// List live scholarships, optionally searching by name.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: &Pagination,
    ) -> EngineResult<Paginated<Scholarship>> {
        let filter = match search {
            Some(needle) => Filter::like("name", needle),
            None => Filter::all(),
        };
        let data = ScholarshipRepo::list(&self.pool, &filter, page).await?;
        let total = ScholarshipRepo::count(&self.pool, &filter).await?;
        Ok(Paginated {
            data,
            total,
            limit: page.clamped_limit(),
            offset: page.clamped_offset(),
        })
    }

    pub async fn update(&self, id: DbId, input: UpdateScholarship) -> EngineResult<Scholarship> {
        match ScholarshipRepo::update(&self.pool, id, &input).await? {
            Some(updated) => Ok(updated),
            None => Err(DomainError::NotFound {
                entity: "scholarship",
                id,
            }
            .into()),
        }
    }

    /// Tombstone a scholarship. Blocked while any live tier exists under it.
    pub async fn remove(&self, id: DbId) -> EngineResult<()> {
        self.find(id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::Scholarship, id).await?;
        ScholarshipRepo::tombstone(&self.pool, id).await?;
        tracing::info!(scholarship_id = id, "scholarship tombstoned");
        Ok(())
    }

    // ── Service tiers ────────────────────────────────────────────────

    /// Add a tier to a scholarship, rejecting a percentage already carried
    /// by a live tier of the same scholarship.
    pub async fn create_tier(
        &self,
        scholarship_id: DbId,
        input: CreateServiceDetail,
    ) -> EngineResult<ServiceDetail> {
        self.find(scholarship_id).await?;
        self.ensure_unique_percentage(scholarship_id, input.percentage, None)
            .await?;

        let created = ScholarshipRepo::create_tier(&self.pool, scholarship_id, &input).await?;
        tracing::info!(
            scholarship_id,
            tier_id = created.id,
            percentage = created.percentage,
            "service tier created"
        );
        Ok(created)
    }

    /// Find a live tier by ID.
    pub async fn find_tier(&self, id: DbId) -> EngineResult<ServiceDetail> {
        ScholarshipRepo::find_tier_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "service tier",
                    id,
                }
                .into()
            })
    }

    /// Live tiers of a scholarship, ordered by percentage.
    pub async fn list_tiers(&self, scholarship_id: DbId) -> EngineResult<Vec<ServiceDetail>> {
        self.find(scholarship_id).await?;
        Ok(ScholarshipRepo::list_tiers(&self.pool, scholarship_id).await?)
    }

    /// Update a tier; a changed percentage is checked against the tier's
    /// live siblings, excluding the tier itself.
    pub async fn update_tier(
        &self,
        id: DbId,
        input: UpdateServiceDetail,
    ) -> EngineResult<ServiceDetail> {
        let existing = self.find_tier(id).await?;
        if let Some(percentage) = input.percentage {
            self.ensure_unique_percentage(existing.scholarship_id, percentage, Some(id))
                .await?;
        }

        match ScholarshipRepo::update_tier(&self.pool, id, &input).await? {
            Some(updated) => Ok(updated),
            None => Err(DomainError::NotFound {
                entity: "service tier",
                id,
            }
            .into()),
        }
    }

    /// Tombstone a tier. Blocked while any live commitment references it.
    pub async fn remove_tier(&self, id: DbId) -> EngineResult<()> {
        self.find_tier(id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::ServiceDetail, id).await?;
        ScholarshipRepo::tombstone_tier(&self.pool, id).await?;
        tracing::info!(tier_id = id, "service tier tombstoned");
        Ok(())
    }

    async fn ensure_unique_percentage(
        &self,
        scholarship_id: DbId,
        percentage: f64,
        exclude_id: Option<DbId>,
    ) -> EngineResult<()> {
        let clash =
            ScholarshipRepo::find_tier_by_percentage(&self.pool, scholarship_id, percentage, exclude_id)
                .await?;
        if clash.is_some() {
            return Err(DomainError::DuplicateTier {
                scholarship_id,
                percentage,
            }
            .into());
        }
        Ok(())
    }
}
