//! Shared fixtures for engine integration tests.
//!
//! Builds the entity chain semester -> scholarship -> tier -> commitment ->
//! inscription through the engine components themselves, so fixtures go
//! through the same validation paths production callers use.

use std::sync::Once;

use chrono::NaiveDate;
use sqlx::PgPool;

use beca_db::models::scholarship::{CreateScholarship, CreateServiceDetail};
use beca_db::models::semester::CreateSemester;
use beca_db::models::transaction::CreateTransaction;
use beca_db::models::work::CreateWork;
use beca_engine::{
    CommitmentLedger, InscriptionTracker, ScholarshipCatalog, SemesterRegistry, TransactionLog,
    WorkBoard,
};

static TRACING: Once = Once::new();

/// Route engine logs through the test harness when `RUST_LOG` asks for them.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A default spring semester: 2026-02-01 through 2026-06-30.
pub async fn seed_semester(pool: &PgPool) -> i64 {
    seed_semester_at(pool, 1, date(2026, 2, 1), date(2026, 6, 30)).await
}

pub async fn seed_semester_at(pool: &PgPool, number: i32, start: NaiveDate, end: NaiveDate) -> i64 {
    SemesterRegistry::new(pool.clone())
        .create(CreateSemester {
            number,
            year: 2026,
            start_date: start,
            end_date: end,
        })
        .await
        .unwrap()
        .id
}

/// A scholarship with one tier at the given percentage and hour target;
/// returns `(scholarship_id, tier_id)`.
pub async fn seed_tier(pool: &PgPool, name: &str, percentage: f64, hours: i32) -> (i64, i64) {
    let catalog = ScholarshipCatalog::new(pool.clone());
    let scholarship = catalog
        .create(CreateScholarship {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap();
    let tier = catalog
        .create_tier(
            scholarship.id,
            CreateServiceDetail {
                percentage,
                hours_per_semester: hours,
                total_hours: hours * 8,
            },
        )
        .await
        .unwrap();
    (scholarship.id, tier.id)
}

/// The full chain for one student: current commitment on a 40-hour tier,
/// enrolled in a default semester with one open work. Returns
/// `(semester_id, commitment_id, inscription_id, work_id)`.
pub async fn seed_enrollment(pool: &PgPool, student_id: i64) -> (i64, i64, i64, i64) {
    let semester_id = seed_semester(pool).await;
    let (_, tier_id) = seed_tier(pool, &format!("Grant {student_id}"), 0.5, 40).await;
    let commitment_id = CommitmentLedger::new(pool.clone())
        .assign(student_id, tier_id)
        .await
        .unwrap()
        .current
        .id;
    let inscription_id = InscriptionTracker::new(pool.clone())
        .enroll(commitment_id, semester_id)
        .await
        .unwrap()
        .id;
    let work_id = seed_work(pool, semester_id, "Library shift").await;
    (semester_id, commitment_id, inscription_id, work_id)
}

/// A work spanning the whole semester window.
pub async fn seed_work(pool: &PgPool, semester_id: i64, title: &str) -> i64 {
    let semester = SemesterRegistry::new(pool.clone())
        .find(semester_id)
        .await
        .unwrap();
    WorkBoard::new(pool.clone())
        .create(CreateWork {
            title: title.to_string(),
            description: "fixture work".to_string(),
            date_begin: semester.start_date,
            date_end: semester.end_date,
            administrative_id: 900,
            semester_id,
            is_open: None,
        })
        .await
        .unwrap()
        .id
}

/// Record an administrator-logged hour entry; returns the transaction id.
pub async fn log_hours(pool: &PgPool, inscription_id: i64, work_id: i64, hours: i32) -> i64 {
    TransactionLog::new(pool.clone())
        .create(CreateTransaction {
            date: date(2026, 3, 10),
            hours,
            comment_student: None,
            comment_administrative: "logged".to_string(),
            work_id,
            inscription_id,
            author_id: 900,
        })
        .await
        .unwrap()
        .id
}
