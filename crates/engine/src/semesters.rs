//! Semester registry: non-overlapping academic terms.

use beca_core::error::DomainError;
use beca_core::types::{DateDay, DbId};
use beca_db::filter::Filter;
use beca_db::models::semester::{CreateSemester, Semester, UpdateSemester};
use beca_db::pagination::{Paginated, Pagination};
use beca_db::repositories::{Entity, SemesterRepo};
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::guard;

/// Owns the semester timeline: live semesters carry pairwise
/// non-overlapping inclusive date intervals.
pub struct SemesterRegistry {
    pool: PgPool,
}

impl SemesterRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a semester, rejecting any overlap with a live semester's
    /// interval (inclusive bounds on both sides).
    pub async fn create(&self, input: CreateSemester) -> EngineResult<Semester> {
        validate_range(input.start_date, input.end_date)?;
        self.ensure_no_overlap(input.start_date, input.end_date, None)
            .await?;

        let created = SemesterRepo::create(&self.pool, &input).await?;
        tracing::info!(semester_id = created.id, year = created.year, "semester created");
        Ok(created)
    }

    /// Update a semester's fields, re-checking the overlap invariant with
    /// the effective date range (submitted values over current ones),
    /// excluding the semester itself from the comparison set.
    pub async fn update(&self, id: DbId, input: UpdateSemester) -> EngineResult<Semester> {
        let existing = self.find(id).await?;
        let start = input.start_date.unwrap_or(existing.start_date);
        let end = input.end_date.unwrap_or(existing.end_date);

        validate_range(start, end)?;
        self.ensure_no_overlap(start, end, Some(id)).await?;

        match SemesterRepo::update(&self.pool, id, &input).await? {
            Some(updated) => Ok(updated),
            None => Err(DomainError::NotFound {
                entity: "semester",
                id,
            }
            .into()),
        }
    }

    /// Tombstone a semester. Blocked while any live inscription or work
    /// references it.
    pub async fn remove(&self, id: DbId) -> EngineResult<()> {
        self.find(id).await?;
        guard::ensure_no_live_dependents(&self.pool, Entity::Semester, id).await?;
        SemesterRepo::tombstone(&self.pool, id).await?;
        tracing::info!(semester_id = id, "semester tombstoned");
        Ok(())
    }

    /// Find a live semester by ID.
    pub async fn find(&self, id: DbId) -> EngineResult<Semester> {
        SemesterRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity: "semester",
                    id,
                }
                .into()
            })
    }

    /// List live semesters, optionally restricted to one calendar year.
    pub async fn list(
        &self,
        year: Option<i32>,
        page: &Pagination,
    ) -> EngineResult<Paginated<Semester>> {
        let filter = match year {
            Some(year) => Filter::eq("year", year),
            None => Filter::all(),
        };
        let data = SemesterRepo::list(&self.pool, &filter, page).await?;
        let total = SemesterRepo::count(&self.pool, &filter).await?;
        Ok(Paginated {
            data,
            total,
            limit: page.clamped_limit(),
            offset: page.clamped_offset(),
        })
    }

    /// Live semesters whose interval intersects `[start, end]`.
    pub async fn find_overlapping(
        &self,
        start: DateDay,
        end: DateDay,
    ) -> EngineResult<Vec<Semester>> {
        Ok(SemesterRepo::find_overlapping(&self.pool, start, end, None).await?)
    }

    async fn ensure_no_overlap(
        &self,
        start: DateDay,
        end: DateDay,
        exclude_id: Option<DbId>,
    ) -> EngineResult<()> {
        let clashes = SemesterRepo::find_overlapping(&self.pool, start, end, exclude_id).await?;
        if clashes.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Overlap { start, end }.into())
        }
    }
}

fn validate_range(start: DateDay, end: DateDay) -> EngineResult<()> {
    if end < start {
        return Err(
            DomainError::Validation("Semester end date precedes its start date".to_string()).into(),
        );
    }
    Ok(())
}
