//! Work board: assignments students log hours against.

use beca_core::error::DomainError;
use beca_core::types::{DateDay, DbId};
use beca_db::filter::Filter;
use beca_db::models::work::{CreateWork, UpdateWork, Work};
use beca_db::pagination::{Paginated, Pagination};
use beca_db::repositories::{Entity, SemesterRepo, WorkRepo};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::guard;

/// Optional narrowing criteria for work listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkQuery {
    pub semester_id: Option<DbId>,
    pub is_open: Option<bool>,
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
}

impl WorkQuery {
    fn to_filter(&self) -> Filter {
        let mut branches = Vec::new();
        if let Some(id) = self.semester_id {
            branches.push(Filter::eq("semester_id", id));
        }
        if let Some(open) = self.is_open {
            branches.push(Filter::eq("is_open", open));
        }
        if let Some(needle) = &self.search {
            branches.push(Filter::like("title", needle.clone()));
        }
        Filter::And(branches)
    }
}

/// Manages work assignments. A work's date window must fall inside its
/// semester's bounds.
pub struct WorkBoard {
    pool: PgPool,
}

impl WorkBoard {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Publish a new work inside a live semester.
    pub async fn create(&self, input: CreateWork) -> EngineResult<Work> {
        let semester = SemesterRepo::find_by_id(&self.pool, input.semester_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "semester",
                id: input.semester_id,
            })?;
        validate_window(
            input.date_begin,
            input.date_end,
            semester.start_date,
            semester.end_date,
        )?;

        let created = WorkRepo::create(&self.pool, &input).await?;
        tracing::info!(
            work_id = created.id,
            semester_id = created.semester_id,
            "work created"
        );
        Ok(created)
    }

    /// Update a work. Changed dates are revalidated against the owning
    /// semester's bounds; the semester itself cannot change.
    pub async fn update(&self, id: DbId, input: UpdateWork) -> EngineResult<Work> {
        let current = self.find(id).await?;

        if input.date_begin.is_some() || input.date_end.is_some() {
            let semester = SemesterRepo::find_by_id(&self.pool, current.semester_id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "semester",
                    id: current.semester_id,
                })?;
            validate_window(
                input.date_begin.unwrap_or(current.date_begin),
                input.date_end.unwrap_or(current.date_end),
                semester.start_date,
                semester.end_date,
            )?;
        }

        WorkRepo::update(&self.pool, id, &input)
            .await?
            .ok_or_else(|| DomainError::NotFound { entity: "work", id }.into())
    }

    /// Tombstone a work. Blocked while any live transaction references it.
    pub async fn remove(&self, id: DbId) -> EngineResult<()> {
        self.find(id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::Work, id).await?;
        WorkRepo::tombstone(&self.pool, id).await?;
        tracing::info!(work_id = id, "work tombstoned");
        Ok(())
    }

    /// Find a live work by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Work> {
        WorkRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| DomainError::NotFound { entity: "work", id }.into())
    }

    /// List live works matching `query`, most recent window first,
    /// paginated.
    pub async fn list(
        &self,
        query: &WorkQuery,
        page: &Pagination,
    ) -> EngineResult<Paginated<Work>> {
        let filter = query.to_filter();
        let data = WorkRepo::list(&self.pool, &filter, page).await?;
        let total = WorkRepo::count(&self.pool, &filter).await?;
        Ok(Paginated {
            data,
            total,
            limit: page.clamped_limit(),
            offset: page.clamped_offset(),
        })
    }
}

fn validate_window(
    begin: DateDay,
    end: DateDay,
    semester_start: DateDay,
    semester_end: DateDay,
) -> EngineResult<()> {
    if end < begin {
        return Err(
            DomainError::Validation("Work end date precedes its begin date".to_string()).into(),
        );
    }
    if begin < semester_start || end > semester_end {
        return Err(DomainError::Validation(
            "Work dates must fall within the semester period".to_string(),
        )
        .into());
    }
    Ok(())
}
