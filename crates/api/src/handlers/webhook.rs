//! Handlers for inbound source-host events.
//!
//! Pipeline per request: require a signature, parse the payload, resolve
//! the hook from the payload subject, verify the signature against the
//! hook secret over the raw body, route and render, then fan out.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use hookrelay_core::error::CoreError;
use hookrelay_core::events::{self, RouteOutcome};
use hookrelay_core::hook::HookKind;
use hookrelay_core::signature;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying `sha1=<hex HMAC>` of the raw body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Header naming the event kind (`push`, `ping`, ...).
pub const EVENT_HEADER: &str = "x-github-event";

/// Outcome of an accepted event.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestResponse {
    Delivered { event: String, delivered_to: usize },
    Ignored { event: String },
    Discarded { hint: &'static str },
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn ingest(
    state: &AppState,
    kind: HookKind,
    headers: &HeaderMap,
    body: &Bytes,
) -> AppResult<Json<DataResponse<IngestResponse>>> {
    let presented = header_str(headers, SIGNATURE_HEADER)
        .filter(|s| !s.is_empty())
        .ok_or(CoreError::MissingSignature)?;

    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Payload is not valid JSON: {e}")))?;

    let hook = state
        .registry
        .resolve_by_subject(kind, events::event_subject(kind, &payload))
        .await?;

    if !signature::verify(body, hook.secret.as_bytes(), presented) {
        tracing::warn!(hook_id = %hook.id, kind = %kind, "Rejected event with a bad signature");
        return Err(CoreError::BadSignature.into());
    }

    let event_kind = header_str(headers, EVENT_HEADER).unwrap_or_default();
    let data = match events::route(&state.templates, kind, event_kind, payload)? {
        RouteOutcome::Ignored => IngestResponse::Ignored {
            event: event_kind.to_string(),
        },
        RouteOutcome::Discarded { hint } => {
            tracing::debug!(hook_id = %hook.id, event_kind, hint, "Event discarded");
            IngestResponse::Discarded { hint }
        }
        RouteOutcome::Deliver { event, message } => {
            let report = state
                .dispatcher
                .dispatch(&hook.destinations, &message)
                .await
                .inspect_err(|_| {
                    tracing::error!(
                        hook_id = %hook.id,
                        subject = %hook.subject,
                        event = %event,
                        "Event not delivered to every destination"
                    );
                })?;
            tracing::info!(
                hook_id = %hook.id,
                event = %event,
                delivered = report.delivered,
                "Event delivered"
            );
            IngestResponse::Delivered {
                event: event.to_string(),
                delivered_to: report.delivered,
            }
        }
    };

    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// POST /webhook/repository
// ---------------------------------------------------------------------------

pub async fn repository_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    ingest(&state, HookKind::Repository, &headers, &body).await
}

// ---------------------------------------------------------------------------
// POST /webhook/organization
// ---------------------------------------------------------------------------

pub async fn organization_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    ingest(&state, HookKind::Organization, &headers, &body).await
}
