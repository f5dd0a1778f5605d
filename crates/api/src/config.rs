use std::path::PathBuf;

use hookrelay_core::validation::DEFAULT_DESTINATION_BASE_URL;
use hookrelay_events::DEFAULT_DELIVERY_TIMEOUT;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Path of the persisted hook document (default: `hooks.json`).
    pub hooks_path: PathBuf,
    /// Directory of `<key>.hbs` template overrides (default: none).
    pub templates_dir: Option<PathBuf>,
    /// Webhook base every destination URL must start with.
    pub destination_base_url: String,
    /// Per-destination delivery timeout in seconds (default: `10`).
    pub delivery_timeout_secs: u64,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum accepted request body in bytes (default: 25 MiB).
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                      |
    /// |-------------------------|----------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                    |
    /// | `PORT`                  | `3000`                                       |
    /// | `HOOKS_PATH`            | `hooks.json`                                 |
    /// | `TEMPLATES_DIR`         | unset                                        |
    /// | `DESTINATION_BASE_URL`  | `https://canary.discordapp.com/api/webhooks` |
    /// | `DELIVERY_TIMEOUT_SECS` | `10`                                         |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                         |
    /// | `MAX_BODY_BYTES`        | `26214400`                                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let hooks_path = std::env::var("HOOKS_PATH")
            .unwrap_or_else(|_| "hooks.json".into())
            .into();

        let templates_dir = std::env::var("TEMPLATES_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let destination_base_url = std::env::var("DESTINATION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_DESTINATION_BASE_URL.into());

        let delivery_timeout_secs: u64 = std::env::var("DELIVERY_TIMEOUT_SECS")
            .map(|s| s.parse().expect("DELIVERY_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_DELIVERY_TIMEOUT.as_secs());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "26214400".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        Self {
            host,
            port,
            hooks_path,
            templates_dir,
            destination_base_url,
            delivery_timeout_secs,
            request_timeout_secs,
            max_body_bytes,
        }
    }
}
