pub mod health;
pub mod hooks;
pub mod register;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the hook relay route tree.
///
/// Route hierarchy:
///
/// ```text
/// /register/repository                 register a repository hook (POST)
/// /register/organization               register an organization hook (POST)
///
/// /hooks/{id}                          get, delete (secret in Authorization)
///
/// /webhook/repository                  inbound repository event (POST)
/// /webhook/organization                inbound organization event (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/register", register::router())
        .nest("/hooks", hooks::router())
        .nest("/webhook", webhook::router())
}
