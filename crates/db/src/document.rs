use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use hookrelay_core::hook::{Hook, HookKind};
use hookrelay_core::types::HookId;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Hook store I/O failed on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hook store document is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize hook document: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// HookDocument
// ---------------------------------------------------------------------------

/// The entire durable state: both hook lists, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDocument {
    pub repository_hooks: Vec<Hook>,
    pub organization_hooks: Vec<Hook>,
}

/// Result of an insert that enforces per-kind subject uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A hook of the same kind already covers the subject.
    Conflict { existing_id: HookId },
}

impl HookDocument {
    /// Parse a persisted document. Missing lists, or a hook filed under the
    /// wrong kind, make the document corrupt.
    pub fn parse(bytes: &[u8]) -> Result<Self, StoreError> {
        let document: Self =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        for kind in [HookKind::Repository, HookKind::Organization] {
            if let Some(stray) = document.hooks(kind).iter().find(|h| h.kind() != kind) {
                return Err(StoreError::Corrupt(format!(
                    "hook {} is filed under {kind} hooks but is a {} hook",
                    stray.id,
                    stray.kind()
                )));
            }
        }

        Ok(document)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn hooks(&self, kind: HookKind) -> &[Hook] {
        match kind {
            HookKind::Repository => &self.repository_hooks,
            HookKind::Organization => &self.organization_hooks,
        }
    }

    fn hooks_mut(&mut self, kind: HookKind) -> &mut Vec<Hook> {
        match kind {
            HookKind::Repository => &mut self.repository_hooks,
            HookKind::Organization => &mut self.organization_hooks,
        }
    }

    /// First hook of `kind` whose subject equals `name` ignoring case.
    pub fn find_by_subject(&self, kind: HookKind, name: &str) -> Option<&Hook> {
        self.hooks(kind).iter().find(|h| h.subject.matches(kind, name))
    }

    /// Look a hook up by id across both lists.
    pub fn find_by_id(&self, id: HookId) -> Option<&Hook> {
        self.repository_hooks
            .iter()
            .chain(self.organization_hooks.iter())
            .find(|h| h.id == id)
    }

    /// Append `hook` unless its subject is already registered for its kind.
    pub fn insert_unique(&mut self, hook: Hook) -> InsertOutcome {
        let kind = hook.kind();
        if let Some(existing) = self.find_by_subject(kind, hook.subject.name()) {
            return InsertOutcome::Conflict {
                existing_id: existing.id,
            };
        }
        self.hooks_mut(kind).push(hook);
        InsertOutcome::Inserted
    }

    /// Remove and return the hook with `id`, if present.
    pub fn remove(&mut self, id: HookId) -> Option<Hook> {
        for kind in [HookKind::Repository, HookKind::Organization] {
            let hooks = self.hooks_mut(kind);
            if let Some(pos) = hooks.iter().position(|h| h.id == id) {
                return Some(hooks.remove(pos));
            }
        }
        None
    }
}
