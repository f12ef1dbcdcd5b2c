//! Integration tests for commitment assignment and the single-current
//! invariant.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use beca_core::error::DomainError;
use beca_engine::{CommitmentLedger, EngineError, InscriptionTracker};
use common::{init_tracing, seed_semester, seed_tier};

// ---------------------------------------------------------------------------
// Test: assignment supersedes the previous current commitment atomically
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_supersedes_previous_current(pool: PgPool) {
    init_tracing();
    let ledger = CommitmentLedger::new(pool.clone());
    let (_, tier_a) = seed_tier(&pool, "Grant A", 0.25, 20).await;
    let (_, tier_b) = seed_tier(&pool, "Grant B", 0.5, 40).await;

    let first = ledger.assign(401, tier_a).await.unwrap();
    assert!(first.superseded.is_none(), "no previous current to flip");
    assert!(first.current.is_current);

    let second = ledger.assign(401, tier_b).await.unwrap();
    let superseded = second.superseded.expect("previous current is reported");
    assert_eq!(superseded.id, first.current.id);
    assert!(!superseded.is_current, "flip is observed already applied");
    assert!(second.current.is_current);

    // The superseded commitment stays live, just no longer current.
    let kept = ledger.find(first.current.id).await.unwrap();
    assert!(!kept.is_current);
    assert_eq!(ledger.find_current(401).await.unwrap().id, second.current.id);
}

// ---------------------------------------------------------------------------
// Test: re-assigning the currently held tier is rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_same_tier_rejected(pool: PgPool) {
    init_tracing();
    let ledger = CommitmentLedger::new(pool.clone());
    let (_, tier) = seed_tier(&pool, "Grant", 0.5, 40).await;

    ledger.assign(402, tier).await.unwrap();
    let err = ledger.assign(402, tier).await.unwrap_err();
    assert_matches!(err, EngineError::Domain(DomainError::Validation(_)));

    // The rejection left the ledger untouched.
    let summaries = ledger.list_by_student(402).await.unwrap();
    assert_eq!(summaries.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: assigning an unknown tier is rejected before any write
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_unknown_tier_rejected(pool: PgPool) {
    init_tracing();
    let ledger = CommitmentLedger::new(pool.clone());

    let err = ledger.assign(403, 9999).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Domain(DomainError::NotFound {
            entity: "service tier",
            ..
        })
    );
    assert!(ledger.list_by_student(403).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: at most one live current commitment under concurrent assigns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_assigns_keep_single_current(pool: PgPool) {
    init_tracing();
    let (_, tier_a) = seed_tier(&pool, "Grant A", 0.25, 20).await;
    let (_, tier_b) = seed_tier(&pool, "Grant B", 0.5, 40).await;
    let ledger_a = CommitmentLedger::new(pool.clone());
    let ledger_b = CommitmentLedger::new(pool.clone());

    // Both assigns race on the same student. Either both apply in some
    // order or one loses to the partial unique index; the invariant that
    // must hold either way is a single live current commitment.
    let (left, right) = tokio::join!(ledger_a.assign(404, tier_a), ledger_b.assign(404, tier_b));
    assert!(
        left.is_ok() || right.is_ok(),
        "at least one assign must win the race"
    );

    let currents: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM commitments \
         WHERE student_id = $1 AND is_current = TRUE AND tombstoned = FALSE",
    )
    .bind(404_i64)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(currents, 1, "exactly one live current commitment remains");
}

// ---------------------------------------------------------------------------
// Test: removal is blocked while an inscription references the commitment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_blocked_by_live_inscription(pool: PgPool) {
    init_tracing();
    let ledger = CommitmentLedger::new(pool.clone());
    let tracker = InscriptionTracker::new(pool.clone());
    let semester_id = seed_semester(&pool).await;
    let (_, tier) = seed_tier(&pool, "Grant", 0.5, 40).await;
    let commitment_id = ledger.assign(405, tier).await.unwrap().current.id;
    let inscription_id = tracker.enroll(commitment_id, semester_id).await.unwrap().id;

    let err = ledger.remove(commitment_id).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Domain(DomainError::HasDependents {
            entity: "commitment",
            dependent: "inscription",
            count: 1,
        })
    );

    // Releasing the dependent unblocks the removal.
    tracker.unenroll(inscription_id).await.unwrap();
    ledger.remove(commitment_id).await.unwrap();
    assert_matches!(
        ledger.find(commitment_id).await.unwrap_err(),
        EngineError::Domain(DomainError::NotFound { .. })
    );
}
