//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Serialize` response shape where the row must not be exposed as-is
//! - Create (and where needed, update) DTOs consumed by the repositories

pub mod category;
pub mod document;
pub mod medical_condition;
pub mod share_token;
pub mod user;
