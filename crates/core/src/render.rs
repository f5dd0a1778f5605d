//! Template registry and renderer for destination message bodies.
//!
//! Templates are Handlebars sources that produce Slack-compatible JSON.
//! Interpolated values are escaped as JSON string content, so a template
//! only has to put `{{field}}` inside a quoted string to stay valid JSON.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::CoreError;

/// File extension for template overrides on disk.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Templates compiled into the binary, keyed by template key.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("push", include_str!("../templates/push.hbs")),
    ("ping_repository", include_str!("../templates/ping_repository.hbs")),
    ("ping_organization", include_str!("../templates/ping_organization.hbs")),
    ("fork", include_str!("../templates/fork.hbs")),
    ("watch", include_str!("../templates/watch.hbs")),
    ("commit_comment", include_str!("../templates/commit_comment.hbs")),
    ("create_branch", include_str!("../templates/create_branch.hbs")),
    ("create_tag", include_str!("../templates/create_tag.hbs")),
    ("delete_branch", include_str!("../templates/delete_branch.hbs")),
    ("delete_tag", include_str!("../templates/delete_tag.hbs")),
    ("member", include_str!("../templates/member.hbs")),
    ("public", include_str!("../templates/public.hbs")),
    ("release", include_str!("../templates/release.hbs")),
    ("status_pending", include_str!("../templates/status_pending.hbs")),
    ("status_success", include_str!("../templates/status_success.hbs")),
    ("status_failure", include_str!("../templates/status_failure.hbs")),
    ("status_error", include_str!("../templates/status_error.hbs")),
];

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure while loading or compiling templates at startup.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile template '{key}': {source}")]
    Compile {
        key: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

// ---------------------------------------------------------------------------
// TemplateSet
// ---------------------------------------------------------------------------

/// Compiled templates, looked up by template key (`push`, `status_success`, ...).
#[derive(Debug)]
pub struct TemplateSet {
    registry: Handlebars<'static>,
}

impl TemplateSet {
    /// An empty set. Every render fails with [`CoreError::Render`].
    pub fn empty() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(escape_json_string);
        Self { registry }
    }

    /// The built-in templates.
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut set = Self::empty();
        for (key, source) in BUILTIN_TEMPLATES {
            set.register(key, source)?;
        }
        Ok(set)
    }

    /// The built-in templates, with any `<key>.hbs` file in `dir` replacing
    /// or adding to them.
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        let mut set = Self::builtin()?;
        let io_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            set.register(key, &source)?;
            if is_builtin_key(key) {
                tracing::debug!(key, path = %path.display(), "Loaded template override");
            } else {
                tracing::warn!(
                    key,
                    path = %path.display(),
                    "Template override does not match any event key and will never be used"
                );
            }
        }

        Ok(set)
    }

    /// Compile and register a single template, replacing any existing one.
    pub fn register(&mut self, key: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(key, source)
            .map_err(|e| TemplateError::Compile {
                key: key.to_string(),
                source: Box::new(e),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.has_template(key)
    }

    /// Render `key` against `data`. Missing fields render as empty text.
    pub fn render(&self, key: &str, data: &Value) -> Result<String, CoreError> {
        if !self.contains(key) {
            return Err(CoreError::Render {
                key: key.to_string(),
            });
        }
        self.registry
            .render(key, data)
            .map_err(|e| CoreError::Internal(format!("Rendering template '{key}' failed: {e}")))
    }
}

/// Escape a value for placement inside a JSON string literal.
fn escape_json_string(raw: &str) -> String {
    let quoted = Value::String(raw.to_owned()).to_string();
    quoted[1..quoted.len() - 1].to_owned()
}

/// Whether `key` names one of the built-in templates events are routed to.
pub fn is_builtin_key(key: &str) -> bool {
    BUILTIN_TEMPLATES.iter().any(|(builtin, _)| *builtin == key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
