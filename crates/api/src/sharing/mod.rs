//! Share tokens ("QR codes"): the issuing side used by the owning patient and
//! the resolving side used by whoever scans the code.
//!
//! Both services sit on the repository traits only, so they run unchanged
//! against PostgreSQL and the in-memory store.

mod issuer;
mod resolver;

pub use issuer::TokenIssuer;
pub use resolver::{SharedRecord, TokenResolver};
