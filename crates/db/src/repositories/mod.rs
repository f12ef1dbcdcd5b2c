//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-step writes open a
//! transaction inside a single method so callers never observe a
//! partially-applied state.

pub mod commitment_repo;
pub mod dependents;
pub mod inscription_repo;
pub mod scholarship_repo;
pub mod semester_repo;
pub mod transaction_repo;
pub mod work_repo;

pub use commitment_repo::CommitmentRepo;
pub use dependents::{DependentGuard, Entity};
pub use inscription_repo::InscriptionRepo;
pub use scholarship_repo::ScholarshipRepo;
pub use semester_repo::SemesterRepo;
pub use transaction_repo::TransactionRepo;
pub use work_repo::WorkRepo;
