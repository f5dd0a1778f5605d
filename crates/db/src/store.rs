//! Keyed access to the hook document.
//!
//! Both implementations serialize every load-mutate-save cycle behind a
//! single async lock, so concurrent registrations and deletions cannot lose
//! each other's writes.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use hookrelay_core::hook::{Hook, HookKind};
use hookrelay_core::types::HookId;

use crate::document::{HookDocument, InsertOutcome, StoreError};

/// Storage backend for registered hooks.
#[async_trait]
pub trait HookStore: Send + Sync {
    /// Snapshot of the whole document.
    async fn load_all(&self) -> Result<HookDocument, StoreError>;

    /// First hook of `kind` whose subject matches `name` ignoring case.
    async fn find_by_subject(&self, kind: HookKind, name: &str)
        -> Result<Option<Hook>, StoreError>;

    async fn find_by_id(&self, id: HookId) -> Result<Option<Hook>, StoreError>;

    /// Append `hook` unless its subject is already taken for its kind.
    async fn insert_unique(&self, hook: Hook) -> Result<InsertOutcome, StoreError>;

    /// Remove the hook with `id`, returning it if it existed.
    async fn delete(&self, id: HookId) -> Result<Option<Hook>, StoreError>;
}

// ---------------------------------------------------------------------------
// FileHookStore
// ---------------------------------------------------------------------------

/// Hook store persisted as a single pretty-printed JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// document, so readers never see a half-written file.
pub struct FileHookStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileHookStore {
    /// Open the document at `path`, creating an empty one if it does not
    /// exist. An existing document is parsed once so corruption is caught at
    /// startup.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        match tokio::fs::try_exists(&store.path).await {
            Ok(true) => {
                let document = store.read().await?;
                tracing::info!(
                    path = %store.path.display(),
                    repository_hooks = document.repository_hooks.len(),
                    organization_hooks = document.organization_hooks.len(),
                    "Loaded hook document"
                );
            }
            Ok(false) => {
                store.write(&HookDocument::default()).await?;
                tracing::info!(path = %store.path.display(), "Created empty hook document");
            }
            Err(source) => return Err(store.io_error(source)),
        }

        Ok(store)
    }

    async fn read(&self) -> Result<HookDocument, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        HookDocument::parse(&bytes)
    }

    async fn write(&self, document: &HookDocument) -> Result<(), StoreError> {
        let bytes = document.to_bytes()?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl HookStore for FileHookStore {
    async fn load_all(&self) -> Result<HookDocument, StoreError> {
        self.read().await
    }

    async fn find_by_subject(
        &self,
        kind: HookKind,
        name: &str,
    ) -> Result<Option<Hook>, StoreError> {
        Ok(self.read().await?.find_by_subject(kind, name).cloned())
    }

    async fn find_by_id(&self, id: HookId) -> Result<Option<Hook>, StoreError> {
        Ok(self.read().await?.find_by_id(id).cloned())
    }

    async fn insert_unique(&self, hook: Hook) -> Result<InsertOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read().await?;
        let outcome = document.insert_unique(hook);
        if outcome == InsertOutcome::Inserted {
            self.write(&document).await?;
        }
        Ok(outcome)
    }

    async fn delete(&self, id: HookId) -> Result<Option<Hook>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read().await?;
        let removed = document.remove(id);
        if removed.is_some() {
            self.write(&document).await?;
        }
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// MemoryHookStore
// ---------------------------------------------------------------------------

/// Non-durable store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryHookStore {
    document: RwLock<HookDocument>,
}

impl MemoryHookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HookStore for MemoryHookStore {
    async fn load_all(&self) -> Result<HookDocument, StoreError> {
        Ok(self.document.read().await.clone())
    }

    async fn find_by_subject(
        &self,
        kind: HookKind,
        name: &str,
    ) -> Result<Option<Hook>, StoreError> {
        Ok(self.document.read().await.find_by_subject(kind, name).cloned())
    }

    async fn find_by_id(&self, id: HookId) -> Result<Option<Hook>, StoreError> {
        Ok(self.document.read().await.find_by_id(id).cloned())
    }

    async fn insert_unique(&self, hook: Hook) -> Result<InsertOutcome, StoreError> {
        Ok(self.document.write().await.insert_unique(hook))
    }

    async fn delete(&self, id: HookId) -> Result<Option<Hook>, StoreError> {
        Ok(self.document.write().await.remove(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use hookrelay_core::hook::{NewHook, Subject};

    use super::*;

    fn hook(kind: HookKind, name: &str) -> Hook {
        Hook::mint(NewHook {
            subject: Subject::new(kind, name),
            destinations: vec!["https://example.invalid/d".into()],
        })
    }

    #[tokio::test]
    async fn open_creates_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        let store = FileHookStore::open(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.load_all().await.unwrap(), HookDocument::default());
    }

    #[tokio::test]
    async fn open_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        std::fs::write(&path, r#"{"organizationHooks": []}"#).unwrap();

        let err = FileHookStore::open(&path).await.err().unwrap();
        assert_matches!(err, StoreError::Corrupt(_));
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.json");

        let repo = hook(HookKind::Repository, "acme/widgets");
        let repo_id = repo.id;
        {
            let store = FileHookStore::open(&path).await.unwrap();
            assert_eq!(store.insert_unique(repo).await.unwrap(), InsertOutcome::Inserted);
        }

        let store = FileHookStore::open(&path).await.unwrap();
        let found = store
            .find_by_subject(HookKind::Repository, "Acme/Widgets")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, repo_id);
        assert!(!dir.path().join("hooks.json.tmp").exists());
    }

    #[tokio::test]
    async fn conflicting_insert_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHookStore::open(dir.path().join("hooks.json")).await.unwrap();
        let first = hook(HookKind::Organization, "acme");
        let first_id = first.id;
        store.insert_unique(first).await.unwrap();

        let outcome = store.insert_unique(hook(HookKind::Organization, "ACME")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Conflict { existing_id: first_id });
        assert_eq!(store.load_all().await.unwrap().organization_hooks.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHookStore::open(dir.path().join("hooks.json")).await.unwrap();
        let repo = hook(HookKind::Repository, "acme/widgets");
        let id = repo.id;
        store.insert_unique(repo).await.unwrap();

        assert_eq!(store.delete(id).await.unwrap().map(|h| h.id), Some(id));
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_registrations_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileHookStore::open(dir.path().join("hooks.json")).await.unwrap());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .insert_unique(hook(HookKind::Repository, &format!("acme/repo-{i}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), InsertOutcome::Inserted);
        }

        assert_eq!(store.load_all().await.unwrap().repository_hooks.len(), 16);
    }

    #[tokio::test]
    async fn memory_store_behaves_like_file_store() {
        let store = MemoryHookStore::new();
        let org = hook(HookKind::Organization, "acme");
        let id = org.id;

        assert_eq!(store.insert_unique(org).await.unwrap(), InsertOutcome::Inserted);
        assert_matches!(
            store.insert_unique(hook(HookKind::Organization, "Acme")).await.unwrap(),
            InsertOutcome::Conflict { existing_id } if existing_id == id
        );
        assert!(store.find_by_subject(HookKind::Organization, "acme").await.unwrap().is_some());
        assert!(store.delete(id).await.unwrap().is_some());
        assert!(store.find_by_id(id).await.unwrap().is_none());
    }
}
