//! Persistence for registered hooks.
//!
//! The whole registry is one JSON document ([`HookDocument`]) holding the
//! repository and organization hook lists. [`HookStore`] puts keyed
//! operations on top of it so callers never handle the document directly,
//! and [`HookRegistry`] layers registration and authenticated lookup on
//! any store.

pub mod document;
pub mod registry;
pub mod store;

pub use document::{HookDocument, InsertOutcome, StoreError};
pub use registry::{HookRegistry, RegistryError};
pub use store::{FileHookStore, HookStore, MemoryHookStore};

/// Create the file-backed store at `path`, writing an empty document if
/// none exists yet.
pub async fn open_store(path: impl Into<std::path::PathBuf>) -> Result<FileHookStore, StoreError> {
    FileHookStore::open(path).await
}
