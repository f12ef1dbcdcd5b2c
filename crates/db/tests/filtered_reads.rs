//! Integration tests for guarded list queries.
//!
//! Verifies that the live-rewrite applied by list/count repositories keeps
//! tombstoned rows out of results, including rows hidden behind a relation
//! branch, and that pagination clamps as documented.

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use beca_db::filter::Filter;
use beca_db::models::scholarship::CreateScholarship;
use beca_db::models::semester::CreateSemester;
use beca_db::models::transaction::CreateTransaction;
use beca_db::models::work::CreateWork;
use beca_db::pagination::Pagination;
use beca_db::repositories::{
    CommitmentRepo, InscriptionRepo, ScholarshipRepo, SemesterRepo, TransactionRepo, WorkRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_semester(pool: &PgPool, number: i32, start: NaiveDate, end: NaiveDate) -> i64 {
    SemesterRepo::create(
        pool,
        &CreateSemester {
            number,
            year: start.year(),
            start_date: start,
            end_date: end,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_work(pool: &PgPool, semester_id: i64, title: &str) -> i64 {
    let semester = SemesterRepo::find_by_id(pool, semester_id)
        .await
        .unwrap()
        .unwrap();
    WorkRepo::create(
        pool,
        &CreateWork {
            title: title.to_string(),
            description: "filter test work".to_string(),
            date_begin: semester.start_date,
            date_end: semester.end_date,
            administrative_id: 900,
            semester_id,
            is_open: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Builds the scholarship -> tier -> commitment chain and enrolls it in
/// the given semester.
async fn seed_inscription(pool: &PgPool, student_id: i64, semester_id: i64) -> i64 {
    let scholarship = ScholarshipRepo::create(
        pool,
        &CreateScholarship {
            name: format!("Grant {student_id}-{semester_id}"),
            description: None,
        },
    )
    .await
    .unwrap();
    let tier = ScholarshipRepo::create_tier(
        pool,
        scholarship.id,
        &beca_db::models::scholarship::CreateServiceDetail {
            percentage: 0.5,
            hours_per_semester: 40,
            total_hours: 320,
        },
    )
    .await
    .unwrap();
    let outcome = CommitmentRepo::assign_current(pool, student_id, tier.id)
        .await
        .unwrap();
    InscriptionRepo::create(pool, outcome.current.id, semester_id)
        .await
        .unwrap()
        .id
}

async fn log_hours(pool: &PgPool, inscription_id: i64, work_id: i64, hours: i32) -> i64 {
    TransactionRepo::create(
        pool,
        &CreateTransaction {
            date: date(2026, 3, 1),
            hours,
            comment_student: None,
            comment_administrative: "logged".to_string(),
            work_id,
            inscription_id,
            author_id: 900,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Test: equality filter narrows a list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_eq_filter_narrows_list(pool: PgPool) {
    let first = seed_semester(&pool, 1, date(2026, 2, 1), date(2026, 6, 30)).await;
    let second = seed_semester(&pool, 2, date(2026, 8, 1), date(2026, 12, 15)).await;
    seed_work(&pool, first, "Library shift").await;
    seed_work(&pool, first, "Lab assistance").await;
    seed_work(&pool, second, "Archive scan").await;

    let filter = Filter::eq("semester_id", first);
    let works = WorkRepo::list(&pool, &filter, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(works.len(), 2);
    assert!(works.iter().all(|w| w.semester_id == first));
    assert_eq!(WorkRepo::count(&pool, &filter).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Test: substring search is case-insensitive
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_like_filter_matches_case_insensitively(pool: PgPool) {
    for name in ["Merit Grant", "Housing Grant", "Stipend"] {
        ScholarshipRepo::create(
            &pool,
            &CreateScholarship {
                name: name.to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    }

    let found = ScholarshipRepo::list(&pool, &Filter::like("name", "grant"), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|s| s.name.contains("Grant")));
}

// ---------------------------------------------------------------------------
// Test: relation filter reaches through the related table
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relation_filter_selects_by_semester(pool: PgPool) {
    let first = seed_semester(&pool, 1, date(2026, 2, 1), date(2026, 6, 30)).await;
    let second = seed_semester(&pool, 2, date(2026, 8, 1), date(2026, 12, 15)).await;
    let work_a = seed_work(&pool, first, "Library shift").await;
    let work_b = seed_work(&pool, second, "Archive scan").await;
    let ins_a = seed_inscription(&pool, 201, first).await;
    let ins_b = seed_inscription(&pool, 201, second).await;
    log_hours(&pool, ins_a, work_a, 5).await;
    log_hours(&pool, ins_b, work_b, 7).await;

    let by_semester = Filter::relation("works", "work_id", "id", Filter::eq("semester_id", first));
    let rows = TransactionRepo::list(&pool, &by_semester, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].work_id, work_a);
    assert_eq!(rows[0].hours, 5);
}

// ---------------------------------------------------------------------------
// Test: relation branches exclude tombstoned related rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relation_filter_excludes_tombstoned_branch(pool: PgPool) {
    let semester = seed_semester(&pool, 1, date(2026, 2, 1), date(2026, 6, 30)).await;
    let work = seed_work(&pool, semester, "Library shift").await;
    let inscription = seed_inscription(&pool, 202, semester).await;
    log_hours(&pool, inscription, work, 5).await;

    let by_semester =
        Filter::relation("works", "work_id", "id", Filter::eq("semester_id", semester));
    assert_eq!(
        TransactionRepo::count(&pool, &by_semester).await.unwrap(),
        1
    );

    // Tombstoning the work must hide the transaction from the relation
    // branch even though the transaction row itself stays live.
    WorkRepo::tombstone(&pool, work).await.unwrap();
    assert_eq!(
        TransactionRepo::count(&pool, &by_semester).await.unwrap(),
        0,
        "live rewrite should apply inside the relation branch"
    );
    assert_eq!(
        TransactionRepo::count(&pool, &Filter::all()).await.unwrap(),
        1,
        "the transaction itself is still live"
    );
}

// ---------------------------------------------------------------------------
// Test: pagination clamps limit and reports the unpaginated total
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pagination_clamps_and_counts(pool: PgPool) {
    let semester = seed_semester(&pool, 1, date(2026, 2, 1), date(2026, 6, 30)).await;
    for i in 0..15 {
        seed_work(&pool, semester, &format!("Work {i}")).await;
    }

    let page = Pagination {
        limit: Some(5),
        offset: Some(0),
    };
    let first_page = WorkRepo::list(&pool, &Filter::all(), &page).await.unwrap();
    assert_eq!(first_page.len(), 5);
    assert_eq!(WorkRepo::count(&pool, &Filter::all()).await.unwrap(), 15);

    // A non-positive limit is clamped up to one row, not passed through.
    let clamped = Pagination {
        limit: Some(0),
        offset: None,
    };
    let rows = WorkRepo::list(&pool, &Filter::all(), &clamped).await.unwrap();
    assert_eq!(rows.len(), 1);
}
