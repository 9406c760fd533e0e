//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireDoctor`] -- Requires the `doctor` role.

pub mod auth;
pub mod rbac;
