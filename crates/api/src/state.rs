use std::sync::Arc;

use medirec_db::repositories::Repositories;

use crate::config::ServerConfig;
use crate::sharing::{TokenIssuer, TokenResolver};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// One repository per table, on whichever backend was configured.
    pub repos: Repositories,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Mints, reuses and revokes share tokens.
    pub issuer: Arc<TokenIssuer>,
    /// Turns a presented share token into the owner's records.
    pub resolver: Arc<TokenResolver>,
}

impl AppState {
    pub fn new(repos: Repositories, config: ServerConfig) -> Self {
        let issuer = TokenIssuer::new(&repos, config.sharing.token_ttl_days);
        let resolver = TokenResolver::new(&repos, config.sharing.demo_tokens_enabled);
        Self {
            repos,
            config: Arc::new(config),
            issuer: Arc::new(issuer),
            resolver: Arc::new(resolver),
        }
    }
}
