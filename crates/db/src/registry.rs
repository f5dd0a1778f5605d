//! Registration, resolution, and authenticated lookup of hooks.

use std::sync::Arc;

use hookrelay_core::error::CoreError;
use hookrelay_core::hook::{Hook, HookKind};
use hookrelay_core::signature::secrets_match;
use hookrelay_core::types::HookId;
use hookrelay_core::validation::{is_valid_hook_id, validate_registration, DestinationPattern};

use crate::document::{InsertOutcome, StoreError};
use crate::store::HookStore;

pub const HOOK_NOT_FOUND: &str = "This hook does not exist.";
pub const SECRET_MISSING: &str =
    "Make sure you include the secret in the \"Authorization\" header.";
pub const SECRET_INVALID: &str = "The secret key you provided was invalid for this hook.";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registrar and resolver over a [`HookStore`].
#[derive(Clone)]
pub struct HookRegistry {
    store: Arc<dyn HookStore>,
    destinations: DestinationPattern,
}

impl HookRegistry {
    pub fn new(store: Arc<dyn HookStore>, destinations: DestinationPattern) -> Self {
        Self {
            store,
            destinations,
        }
    }

    pub fn store(&self) -> &Arc<dyn HookStore> {
        &self.store
    }

    /// Validate, mint, and persist a new hook.
    ///
    /// The returned hook carries its secret; this is the only response that
    /// exposes it without the caller presenting it first.
    pub async fn register(
        &self,
        kind: HookKind,
        subject: Option<&str>,
        destinations: Option<&[String]>,
    ) -> Result<Hook, RegistryError> {
        let registration = validate_registration(kind, subject, destinations, &self.destinations)?;
        let hook = Hook::mint(registration);

        match self.store.insert_unique(hook.clone()).await? {
            InsertOutcome::Inserted => {
                tracing::info!(
                    hook_id = %hook.id,
                    kind = %kind,
                    subject = %hook.subject,
                    destinations = hook.destinations.len(),
                    "Hook registered"
                );
                Ok(hook)
            }
            InsertOutcome::Conflict { existing_id } => {
                tracing::debug!(
                    kind = %kind,
                    subject = %hook.subject,
                    existing_id = %existing_id,
                    "Registration rejected, subject already registered"
                );
                Err(CoreError::Conflict { existing_id }.into())
            }
        }
    }

    /// Find the hook an inbound event is addressed to.
    ///
    /// `candidate` is the subject extracted from the payload; `None` (an
    /// unrecognized payload shape) resolves to not found.
    pub async fn resolve_by_subject(
        &self,
        kind: HookKind,
        candidate: Option<&str>,
    ) -> Result<Hook, RegistryError> {
        let Some(name) = candidate else {
            tracing::debug!(kind = %kind, "Payload carries no subject for this hook kind");
            return Err(CoreError::NotFound(HOOK_NOT_FOUND.into()).into());
        };

        self.store
            .find_by_subject(kind, name)
            .await?
            .ok_or_else(|| CoreError::NotFound(HOOK_NOT_FOUND.into()).into())
    }

    /// Authenticated lookup by id.
    ///
    /// Order of checks: id syntax (a malformed id is a guaranteed miss),
    /// presence of the secret, existence, then secret equality.
    pub async fn resolve_by_id(
        &self,
        id: &str,
        presented_secret: Option<&str>,
    ) -> Result<Hook, RegistryError> {
        let id = parse_hook_id(id)?;
        let secret = presented_secret.ok_or_else(|| CoreError::Unauthorized(SECRET_MISSING.into()))?;

        let hook = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(HOOK_NOT_FOUND.into()))?;

        if !secrets_match(&hook.secret, secret) {
            tracing::warn!(hook_id = %id, "Rejected hook access with an invalid secret");
            return Err(CoreError::Forbidden(SECRET_INVALID.into()).into());
        }

        Ok(hook)
    }

    /// Authenticate, then remove the hook. Returns the removed hook.
    pub async fn delete(
        &self,
        id: &str,
        presented_secret: Option<&str>,
    ) -> Result<Hook, RegistryError> {
        let hook = self.resolve_by_id(id, presented_secret).await?;

        // Another request may have removed it since authentication.
        let removed = self
            .store
            .delete(hook.id)
            .await?
            .ok_or_else(|| CoreError::NotFound(HOOK_NOT_FOUND.into()))?;

        tracing::info!(hook_id = %removed.id, kind = %removed.kind(), "Hook deleted");
        Ok(removed)
    }
}

fn parse_hook_id(id: &str) -> Result<HookId, CoreError> {
    if !is_valid_hook_id(id) {
        return Err(CoreError::InvalidId(id.to_string()));
    }
    HookId::parse_str(id).map_err(|_| CoreError::InvalidId(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
