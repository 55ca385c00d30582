// colonycore-export/src/blob.rs
// ============================================================================
// Module: Blob Store
// Description: The object-store contract export artifacts are written to,
// plus an in-process reference implementation.
// Purpose: Let the export worker be tested without a real object store, and
// let deployments swap in one of their own.
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

/// Errors a [`BlobStore`] can return.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The backing store rejected or failed the write.
    #[error("blob store write failed for {key}: {message}")]
    WriteFailed {
        /// The key that failed to write.
        key: String,
        /// The backend's error message.
        message: String,
    },
}

/// An artifact already written to a [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// The bytes written.
    pub bytes: Vec<u8>,
    /// The MIME type recorded alongside the bytes.
    pub content_type: String,
}

/// Where the export worker writes rendered artifacts. Keys are opaque paths
/// of the form `export/<id>/<slug>.<format>`.
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` at `key`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError`] if the backend rejects the write. A
    /// partial write from a prior failed format is left in place; the
    /// worker does not roll writes back.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), BlobStoreError>;

    /// Reads back a previously written artifact, if present.
    fn get(&self, key: &str) -> Option<StoredBlob>;
}

/// An in-process [`BlobStore`] backed by a `Mutex<BTreeMap>`. Suitable for
/// tests and for single-node deployments that don't need real object
/// storage.
#[derive(Default)]
pub struct InMemoryBlobStore {
    /// Stored blobs, keyed by their blob store key.
    blobs: Mutex<BTreeMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Creates an empty in-memory blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), BlobStoreError> {
        let mut blobs = self.blobs.lock().map_err(|_| BlobStoreError::WriteFailed {
            key: key.to_string(),
            message: "blob store lock poisoned".to_string(),
        })?;
        blobs.insert(
            key.to_string(),
            StoredBlob { bytes: bytes.to_vec(), content_type: content_type.to_string() },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.lock().ok()?.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_blob() {
        let store = InMemoryBlobStore::new();
        store.put("export/e1/t.json", b"[]", "application/json").expect("put succeeds");
        let blob = store.get("export/e1/t.json").expect("blob present");
        assert_eq!(blob.bytes, b"[]");
        assert_eq!(blob.content_type, "application/json");
    }

    #[test]
    fn missing_key_returns_none() {
        let store = InMemoryBlobStore::new();
        assert!(store.get("nope").is_none());
    }
}
