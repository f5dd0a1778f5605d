use std::sync::Arc;

use hookrelay_core::render::TemplateSet;
use hookrelay_db::HookRegistry;
use hookrelay_events::Dispatcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Hook registration and resolution over the configured store.
    pub registry: HookRegistry,
    /// Compiled message templates, read-only after startup.
    pub templates: Arc<TemplateSet>,
    /// Outbound webhook fan-out.
    pub dispatcher: Dispatcher,
}
