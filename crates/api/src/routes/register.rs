//! Route definitions for hook registration.
//!
//! ```text
//! POST   /repository       register_repository
//! POST   /organization     register_organization
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::register;
use crate::state::AppState;

/// Registration routes -- mounted at `/register`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repository", post(register::register_repository))
        .route("/organization", post(register::register_organization))
}
