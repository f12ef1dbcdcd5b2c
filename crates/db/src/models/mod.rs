//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod commitment;
pub mod inscription;
pub mod scholarship;
pub mod semester;
pub mod transaction;
pub mod work;
