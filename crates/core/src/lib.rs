//! Domain rules for the MediRec backend.
//!
//! Everything in this crate is pure: no I/O, no database, no HTTP. The
//! repository and API layers call into these helpers so the rules live in one
//! place.

pub mod categories;
pub mod documents;
pub mod error;
pub mod roles;
pub mod sharing;
pub mod types;
pub mod users;
