//! Integration tests for work-assignment date windows and listing.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use beca_core::error::DomainError;
use beca_db::models::work::{CreateWork, UpdateWork};
use beca_engine::{EngineError, WorkBoard, WorkQuery};
use common::{date, init_tracing, seed_semester, seed_work};

fn new_work(semester_id: i64, begin: chrono::NaiveDate, end: chrono::NaiveDate) -> CreateWork {
    CreateWork {
        title: "Library shift".to_string(),
        description: "window test".to_string(),
        date_begin: begin,
        date_end: end,
        administrative_id: 900,
        semester_id,
        is_open: None,
    }
}

// ---------------------------------------------------------------------------
// Test: the work window must fall inside the semester bounds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_window_outside_semester_rejected(pool: PgPool) {
    init_tracing();
    // Seeded semester runs 2026-02-01 through 2026-06-30.
    let semester_id = seed_semester(&pool).await;
    let board = WorkBoard::new(pool.clone());

    // Starts before the semester.
    let err = board
        .create(new_work(semester_id, date(2026, 1, 15), date(2026, 3, 1)))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Domain(DomainError::Validation(_)));

    // Ends after the semester.
    let err = board
        .create(new_work(semester_id, date(2026, 6, 1), date(2026, 7, 15)))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Domain(DomainError::Validation(_)));

    // Reversed window.
    let err = board
        .create(new_work(semester_id, date(2026, 4, 1), date(2026, 3, 1)))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Domain(DomainError::Validation(_)));

    // Exactly the semester bounds is accepted (inclusive).
    let work = board
        .create(new_work(semester_id, date(2026, 2, 1), date(2026, 6, 30)))
        .await
        .unwrap();
    assert!(work.is_open, "works default to open");
}

// ---------------------------------------------------------------------------
// Test: updated dates are revalidated against the owning semester
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_revalidates_window(pool: PgPool) {
    init_tracing();
    let semester_id = seed_semester(&pool).await;
    let board = WorkBoard::new(pool.clone());
    let work_id = seed_work(&pool, semester_id, "Library shift").await;

    // Only one bound changes; the effective window is checked as a whole.
    let err = board
        .update(
            work_id,
            UpdateWork {
                date_end: Some(date(2026, 7, 10)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Domain(DomainError::Validation(_)));

    let updated = board
        .update(
            work_id,
            UpdateWork {
                date_begin: Some(date(2026, 3, 1)),
                date_end: Some(date(2026, 5, 31)),
                is_open: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.date_begin, date(2026, 3, 1));
    assert_eq!(updated.date_end, date(2026, 5, 31));
    assert!(!updated.is_open);
}

// ---------------------------------------------------------------------------
// Test: listing narrows by semester, open flag, and title search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_filters(pool: PgPool) {
    init_tracing();
    let semester_id = seed_semester(&pool).await;
    let board = WorkBoard::new(pool.clone());
    let shift = seed_work(&pool, semester_id, "Library shift").await;
    let lab = seed_work(&pool, semester_id, "Lab assistance").await;
    board
        .update(
            lab,
            UpdateWork {
                is_open: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let open = board
        .list(
            &WorkQuery {
                semester_id: Some(semester_id),
                is_open: Some(true),
                ..Default::default()
            },
            &Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(open.total, 1);
    assert_eq!(open.data[0].id, shift);

    let by_title = board
        .list(
            &WorkQuery {
                search: Some("lab".to_string()),
                ..Default::default()
            },
            &Default::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_title.total, 1);
    assert_eq!(by_title.data[0].id, lab);
}
