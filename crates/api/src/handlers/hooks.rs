//! Handlers for authenticated hook introspection and deletion.
//!
//! The hook secret is presented verbatim in the `Authorization` header.

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use hookrelay_core::hook::{Hook, HookKind};
use hookrelay_core::types::HookId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A hook as returned by `GET /hooks/{id}`: the stored record plus its kind.
#[derive(Debug, Serialize)]
pub struct HookView {
    #[serde(flatten)]
    pub hook: Hook,
    #[serde(rename = "type")]
    pub kind: HookKind,
}

/// Confirmation body for a deleted hook.
#[derive(Debug, Serialize)]
pub struct DeletedHook {
    pub id: HookId,
    pub deleted: bool,
}

/// The presented secret, if any. An empty header counts as absent.
fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// GET /hooks/{id}
// ---------------------------------------------------------------------------

pub async fn get_hook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let hook = state
        .registry
        .resolve_by_id(&id, presented_secret(&headers))
        .await?;

    let kind = hook.kind();
    Ok(Json(DataResponse {
        data: HookView { hook, kind },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /hooks/{id}
// ---------------------------------------------------------------------------

pub async fn delete_hook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let removed = state
        .registry
        .delete(&id, presented_secret(&headers))
        .await?;

    Ok(Json(DataResponse {
        data: DeletedHook {
            id: removed.id,
            deleted: true,
        },
    }))
}
