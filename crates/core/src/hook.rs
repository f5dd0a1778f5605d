//! The hook entity: a binding from a repository or organization to a
//! shared secret and a short list of chat destinations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{HookId, Timestamp};

// ---------------------------------------------------------------------------
// HookKind
// ---------------------------------------------------------------------------

/// Which kind of source entity a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Repository,
    Organization,
}

impl HookKind {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Organization => "organization",
        }
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// The repository full name or organization login a hook is bound to.
///
/// Serialized as a single kind-specific field (`repositoryFullname` or
/// `organization`) so it can be flattened into the hook record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "repositoryFullname")]
    Repository(String),
    #[serde(rename = "organization")]
    Organization(String),
}

impl Subject {
    pub fn new(kind: HookKind, name: impl Into<String>) -> Self {
        match kind {
            HookKind::Repository => Self::Repository(name.into()),
            HookKind::Organization => Self::Organization(name.into()),
        }
    }

    pub fn kind(&self) -> HookKind {
        match self {
            Self::Repository(_) => HookKind::Repository,
            Self::Organization(_) => HookKind::Organization,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Repository(name) | Self::Organization(name) => name,
        }
    }

    /// Case-insensitive match against a candidate of the same kind.
    pub fn matches(&self, kind: HookKind, candidate: &str) -> bool {
        self.kind() == kind && self.name().eq_ignore_ascii_case(candidate)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Hook
// ---------------------------------------------------------------------------

/// A registered hook as persisted in the hook document.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub id: HookId,
    pub secret: String,
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(alias = "discordWebhooks")]
    pub destinations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Hook {
    /// Mint a fresh hook from a validated registration: new random id and
    /// secret, creation time set to now.
    pub fn mint(registration: NewHook) -> Self {
        Self {
            id: Uuid::new_v4(),
            secret: Uuid::new_v4().to_string(),
            subject: registration.subject,
            destinations: registration.destinations,
            created_at: Some(chrono::Utc::now()),
        }
    }

    pub fn kind(&self) -> HookKind {
        self.subject.kind()
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("subject", &self.subject)
            .field("destinations", &self.destinations)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A registration that passed validation and is ready to be minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHook {
    pub subject: Subject,
    /// Unique destination URLs in first-occurrence order.
    pub destinations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
