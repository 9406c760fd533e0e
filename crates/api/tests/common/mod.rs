#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use medirec_api::auth::jwt::{generate_access_token, JwtConfig};
use medirec_api::auth::password::hash_password;
use medirec_api::config::{ServerConfig, ShareConfig};
use medirec_api::router::build_app_router;
use medirec_api::state::AppState;
use medirec_db::models::user::{CreateUser, User};
use medirec_db::repositories::Repositories;
use tower::ServiceExt;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// `%PDF-1.4\n` as base64.
pub const PDF_BASE64: &str = "JVBERi0xLjQK";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        seed_demo_data: false,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        sharing: ShareConfig::default(),
    }
}

/// A router plus direct handles on its store, for arranging state that has
/// no HTTP path (expired tokens, users with known ids).
pub struct TestApp {
    pub app: Router,
    pub repos: Repositories,
    pub config: ServerConfig,
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` call.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Bearer token for `user`, signed with the app's secret.
    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, &user.role, &self.config.jwt)
            .expect("token generation should succeed")
    }
}

/// Build the full application router on a fresh in-memory store.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

/// Like [`build_test_app`], with a caller-supplied config.
pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let repos = Repositories::in_memory();
    let state = AppState::new(repos.clone(), config.clone());
    let app = build_app_router(state, &config);
    TestApp { app, repos, config }
}

/// Create a user directly in the store with [`TEST_PASSWORD`].
pub async fn create_user(repos: &Repositories, username: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    repos
        .users
        .create(&CreateUser {
            username: username.to_string(),
            password_hash,
            display_name: format!("Test {username}"),
            role: role.to_string(),
            email: Some(format!("{username}@test.com")),
        })
        .await
        .expect("user creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("POST", uri, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// JSON body for a document upload of [`PDF_BASE64`].
pub fn pdf_upload(category_id: i64, title: &str, date: &str) -> serde_json::Value {
    serde_json::json!({
        "categoryId": category_id,
        "title": title,
        "date": date,
        "file": {
            "fileName": format!("{title}.pdf"),
            "mimeType": "application/pdf",
            "data": PDF_BASE64,
        },
    })
}
