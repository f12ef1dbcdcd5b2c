//! Pure domain logic for the work-study scholarship engine.
//!
//! No I/O lives here: shared type aliases, the domain error taxonomy, and
//! the inscription completion-state transition function.

pub mod completion;
pub mod error;
pub mod types;
