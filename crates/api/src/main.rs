use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hookrelay_api::config::ServerConfig;
use hookrelay_api::router::build_app_router;
use hookrelay_api::state::AppState;
use hookrelay_core::render::TemplateSet;
use hookrelay_core::validation::DestinationPattern;
use hookrelay_db::HookRegistry;
use hookrelay_events::Dispatcher;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hookrelay_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Hook store ---
    let store = hookrelay_db::open_store(config.hooks_path.clone())
        .await
        .expect("Failed to open hook store");
    tracing::info!(path = %config.hooks_path.display(), "Hook store ready");

    let destinations = DestinationPattern::new(&config.destination_base_url)
        .expect("DESTINATION_BASE_URL must produce a valid pattern");
    let registry = HookRegistry::new(Arc::new(store), destinations);

    // --- Templates ---
    let templates = match &config.templates_dir {
        Some(dir) => TemplateSet::with_overrides(dir),
        None => TemplateSet::builtin(),
    }
    .expect("Failed to load message templates");
    tracing::info!(
        overrides = config.templates_dir.is_some(),
        "Message templates loaded"
    );

    // --- Dispatcher ---
    let dispatcher = Dispatcher::new(Duration::from_secs(config.delivery_timeout_secs))
        .expect("Failed to build HTTP client");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        registry,
        templates: Arc::new(templates),
        dispatcher,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
