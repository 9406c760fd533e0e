use medirec_core::sharing::DEFAULT_TOKEN_TTL_DAYS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. When unset the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Insert demo users, categories and a condition summary into an empty store.
    pub seed_demo_data: bool,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Share token ("QR code") settings.
    pub sharing: ShareConfig,
}

/// Settings for share token issuance and resolution.
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// Lifetime of a newly issued token in days (default: `30`).
    pub token_ttl_days: i64,
    /// Accept the fixed demo tokens when no stored token matches (default: off).
    pub demo_tokens_enabled: bool,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            demo_tokens_enabled: false,
        }
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` (case-insensitive).
fn parse_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            other => panic!("{key} must be a boolean, got '{other}'"),
        },
        Err(_) => default,
    }
}

/// Demo tokens point at the seeded demo patient, so they are refused unless
/// that patient is seeded too.
fn ensure_demo_tokens_seeded(demo_tokens_enabled: bool, seed_demo_data: bool) {
    assert!(
        !demo_tokens_enabled || seed_demo_data,
        "SHARE_DEMO_TOKENS=true requires SEED_DEMO_DATA=true"
    );
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`          | unset (in-memory store)    |
    /// | `SEED_DEMO_DATA`        | `false`                    |
    /// | `SHARE_TOKEN_TTL_DAYS`  | `30`                       |
    /// | `SHARE_DEMO_TOKENS`     | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let token_ttl_days: i64 = std::env::var("SHARE_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_DAYS.to_string())
            .parse()
            .expect("SHARE_TOKEN_TTL_DAYS must be a valid i64");
        assert!(token_ttl_days > 0, "SHARE_TOKEN_TTL_DAYS must be positive");

        let seed_demo_data = parse_flag("SEED_DEMO_DATA", false);
        let demo_tokens_enabled = parse_flag("SHARE_DEMO_TOKENS", false);
        ensure_demo_tokens_seeded(demo_tokens_enabled, seed_demo_data);

        let sharing = ShareConfig {
            token_ttl_days,
            demo_tokens_enabled,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            seed_demo_data,
            jwt: JwtConfig::from_env(),
            sharing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_tokens_with_seeding_are_accepted() {
        ensure_demo_tokens_seeded(true, true);
        ensure_demo_tokens_seeded(false, false);
        ensure_demo_tokens_seeded(false, true);
    }

    #[test]
    #[should_panic(expected = "SHARE_DEMO_TOKENS=true requires SEED_DEMO_DATA=true")]
    fn demo_tokens_without_seeding_are_refused() {
        ensure_demo_tokens_seeded(true, false);
    }
}
