//! Application router: routes plus the tower-http middleware stack.
//!
//! [`build_app_router`] is shared by `main.rs` and the integration tests so
//! both exercise the same layers.

use std::borrow::Cow;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::Router;
use medirec_core::sharing::log_prefix;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Public share-token routes. The segment after this prefix is a bearer
/// capability and must not reach the logs.
const SHARE_PATH_PREFIX: &str = "/api/v1/qrcode/";

/// Build the application [`Router`]: `/health` at the root, everything else
/// under `/api/v1`.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // Layers run outermost-last: CORS sees the request first.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Span for one request, with any share token in the path cut to its prefix.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %redact_share_token(request.uri().path()),
        request_id,
    )
}

/// Replace the token segment of a share-token path with its loggable prefix.
fn redact_share_token(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix(SHARE_PATH_PREFIX) else {
        return Cow::Borrowed(path);
    };
    let (token, tail) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if token.is_empty() {
        return Cow::Borrowed(path);
    }
    Cow::Owned(format!("{SHARE_PATH_PREFIX}{}***{tail}", log_prefix(token)))
}

/// CORS for the configured browser origins. An unparsable origin aborts
/// startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_token_paths_are_redacted() {
        let token = "0123456789abcdef0123456789abcdef";
        assert_eq!(
            redact_share_token(&format!("/api/v1/qrcode/{token}")),
            "/api/v1/qrcode/01234567***"
        );
        assert_eq!(
            redact_share_token(&format!("/api/v1/qrcode/{token}/documents/7/download")),
            "/api/v1/qrcode/01234567***/documents/7/download"
        );
    }

    #[test]
    fn other_paths_are_untouched() {
        for path in ["/health", "/api/v1/users/1/qrcode", "/api/v1/qrcode/", "/api/v1/documents/3"] {
            assert_eq!(redact_share_token(path), path);
        }
    }
}
