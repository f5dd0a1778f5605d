#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use hookrelay_api::config::ServerConfig;
use hookrelay_api::router::build_app_router;
use hookrelay_api::state::AppState;
use hookrelay_core::render::TemplateSet;
use hookrelay_core::signature::compute_signature;
use hookrelay_core::validation::DestinationPattern;
use hookrelay_db::{HookRegistry, HookStore, MemoryHookStore};
use hookrelay_events::Dispatcher;

/// A 68-character webhook token.
pub const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz0123456789_.-ABCDEFGHIJKLMNOPQRSTUVWXYZ012";

/// Webhook base path served by the mock destination.
pub const WEBHOOK_PATH: &str = "/api/webhooks";

/// Build a test `ServerConfig` whose destinations live under `base_url`.
pub fn test_config(base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        hooks_path: "hooks.json".into(),
        templates_dir: None,
        destination_base_url: base_url.to_string(),
        delivery_timeout_secs: 5,
        request_timeout_secs: 30,
        max_body_bytes: 1024 * 1024,
    }
}

/// A router wired to a mock destination server.
pub struct TestApp {
    pub router: Router,
    pub server: MockServer,
    pub store: Arc<dyn HookStore>,
}

impl TestApp {
    /// Start a mock destination and build the app over an in-memory store.
    pub async fn start() -> Self {
        Self::with_store(Arc::new(MemoryHookStore::new())).await
    }

    /// Start a mock destination and build the app over `store`.
    pub async fn with_store(store: Arc<dyn HookStore>) -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}{WEBHOOK_PATH}", server.uri());
        let router = build_test_app(Arc::clone(&store), &base_url);
        Self {
            router,
            server,
            store,
        }
    }

    /// A destination URL accepted by this app's registration validation.
    pub fn destination(&self, id: &str) -> String {
        format!("{}{WEBHOOK_PATH}/{id}/{TOKEN}", self.server.uri())
    }

    /// Path the dispatcher POSTs to for `destination(id)`.
    pub fn delivery_path(id: &str) -> String {
        format!("{WEBHOOK_PATH}/{id}/{TOKEN}/slack")
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (request ID, timeout, tracing, panic recovery) that
/// production uses.
pub fn build_test_app(store: Arc<dyn HookStore>, base_url: &str) -> Router {
    let config = test_config(base_url);
    let destinations = DestinationPattern::new(base_url).unwrap();

    let state = AppState {
        config: Arc::new(config.clone()),
        registry: HookRegistry::new(store, destinations),
        templates: Arc::new(TemplateSet::builtin().unwrap()),
        dispatcher: Dispatcher::new(std::time::Duration::from_secs(5)).unwrap(),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

/// `GET` or `DELETE` a hook, presenting `secret` in `Authorization` if given.
pub async fn with_secret(app: Router, method: Method, uri: &str, secret: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(secret) = secret {
        builder = builder.header("authorization", secret);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// POST an inbound event with optional `X-GitHub-Event` and `X-Hub-Signature`.
pub async fn post_event(
    app: Router,
    uri: &str,
    event: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(event) = event {
        builder = builder.header("x-github-event", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature", signature);
    }
    send(app, builder.body(Body::from(body.to_vec())).unwrap()).await
}

/// POST an inbound event signed with `secret`.
pub async fn post_signed_event(
    app: Router,
    uri: &str,
    event: &str,
    secret: &str,
    payload: &Value,
) -> Response {
    let body = payload.to_string();
    let signature = compute_signature(secret.as_bytes(), body.as_bytes());
    post_event(app, uri, Some(event), Some(&signature), body.as_bytes()).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a repository hook and return its `data` object.
pub async fn register_repository(app: Router, repository: &str, destinations: &[String]) -> Value {
    let response = post_json(
        app,
        "/register/repository",
        &serde_json::json!({ "repository": repository, "destinations": destinations }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Register an organization hook and return its `data` object.
pub async fn register_organization(app: Router, organization: &str, destinations: &[String]) -> Value {
    let response = post_json(
        app,
        "/register/organization",
        &serde_json::json!({ "organization": organization, "destinations": destinations }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
