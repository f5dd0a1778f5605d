//! Route definitions for inbound events.
//!
//! ```text
//! POST   /repository       repository_event     (X-Hub-Signature, X-GitHub-Event)
//! POST   /organization     organization_event   (X-Hub-Signature, X-GitHub-Event)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Inbound event routes -- mounted at `/webhook`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repository", post(webhook::repository_event))
        .route("/organization", post(webhook::organization_event))
}
