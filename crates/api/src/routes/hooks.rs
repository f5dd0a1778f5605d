//! Route definitions for hook introspection.
//!
//! ```text
//! GET    /{id}     get_hook      (Authorization: <secret>)
//! DELETE /{id}     delete_hook   (Authorization: <secret>)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::hooks;
use crate::state::AppState;

/// Hook routes -- mounted at `/hooks`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(hooks::get_hook).delete(hooks::delete_hook))
}
