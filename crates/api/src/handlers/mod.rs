//! Request handlers, one module per resource.
//!
//! Handlers validate input with the helpers in `medirec_core`, delegate to
//! the repositories (or the share token services) held in [`AppState`], and
//! map errors via [`AppError`].
//!
//! [`AppState`]: crate::state::AppState
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod categories;
pub mod documents;
pub mod medical_condition;
pub mod patients;
pub mod qrcode;
