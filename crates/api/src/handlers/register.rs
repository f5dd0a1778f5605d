//! Handlers for hook registration.
//!
//! Bodies are read as loose JSON so a field of the wrong type is reported
//! through the same validation error list as a missing or malformed one.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use hookrelay_core::hook::HookKind;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Current name of the destination list field.
pub const DESTINATIONS_FIELD: &str = "destinations";

/// Legacy name of the destination list field, still accepted.
pub const LEGACY_DESTINATIONS_FIELD: &str = "discordWebhooks";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn subject_field(kind: HookKind) -> &'static str {
    match kind {
        HookKind::Repository => "repository",
        HookKind::Organization => "organization",
    }
}

/// Destination list from the body. Non-string entries become empty strings
/// so they fail the URL format check instead of vanishing.
fn destinations_from(body: &Value) -> Option<Vec<String>> {
    body.get(DESTINATIONS_FIELD)
        .or_else(|| body.get(LEGACY_DESTINATIONS_FIELD))
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .map(|url| url.as_str().unwrap_or_default().to_string())
                .collect()
        })
}

async fn register(
    state: &AppState,
    kind: HookKind,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if !body.is_object() {
        return Err(AppError::BadRequest("Request body must be a JSON object".into()));
    }

    let subject = body.get(subject_field(kind)).and_then(Value::as_str);
    let destinations = destinations_from(&body);

    let hook = state
        .registry
        .register(kind, subject, destinations.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: hook })))
}

// ---------------------------------------------------------------------------
// POST /register/repository
// ---------------------------------------------------------------------------

/// Register a hook for a single repository (`owner/name`).
pub async fn register_repository(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    register(&state, HookKind::Repository, body).await
}

// ---------------------------------------------------------------------------
// POST /register/organization
// ---------------------------------------------------------------------------

/// Register a hook for every repository of an organization.
pub async fn register_organization(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    register(&state, HookKind::Organization, body).await
}
