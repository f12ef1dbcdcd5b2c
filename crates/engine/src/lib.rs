//! Consistency engine for the work-study scholarship program.
//!
//! Keeps a student's scholarship obligation (commitment), its per-term
//! enrollment (inscription), and the hours logged against it mutually
//! consistent. Each component holds an explicitly injected connection pool;
//! there is no process-wide storage singleton. Every multi-step write runs
//! inside a single database transaction so callers never observe a
//! partially-applied state.

pub mod commitments;
pub mod error;
pub mod inscriptions;
pub mod scholarships;
pub mod semesters;
pub mod transactions;
pub mod works;

mod guard;

pub use commitments::CommitmentLedger;
pub use error::{EngineError, EngineResult};
pub use inscriptions::InscriptionTracker;
pub use scholarships::ScholarshipCatalog;
pub use semesters::SemesterRegistry;
pub use transactions::{TransactionLog, TransactionQuery};
pub use works::{WorkBoard, WorkQuery};
