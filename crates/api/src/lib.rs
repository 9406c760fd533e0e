//! MediRec API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, share
//! token services) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod seed;
pub mod sharing;
pub mod state;
