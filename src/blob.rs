//! Registry for uploaded image bytes.
//!
//! Uploaded images have no stable location, so the registry hands out
//! revocable [`BlobHandle`]s. Handles stay valid until the registry is torn
//! down: an undo may bring any earlier item back on screen, so nothing is
//! released mid-session.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Handle to one uploaded blob.
///
/// Rendered as `blob:<id>/<file_name>` so the derived display name is the
/// uploaded file's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobHandle {
    id: u64,
    file_name: String,
}

impl BlobHandle {
    /// Registry-unique id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the uploaded file.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}/{}", self.id, self.file_name)
    }
}

/// Owner of uploaded blob data.
#[derive(Default)]
pub struct BlobRegistry {
    next_id: u64,
    live: HashMap<u64, Vec<u8>>,
    released: usize,
}

impl BlobRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of uploaded bytes and return a handle to them.
    pub fn register(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> BlobHandle {
        let id = self.next_id;
        self.next_id += 1;
        let handle = BlobHandle {
            id,
            file_name: file_name.into(),
        };
        debug!(%handle, size = bytes.len(), "registered blob");
        self.live.insert(id, bytes);
        handle
    }

    /// Read a file into the registry.
    pub fn register_file(&mut self, path: &Path) -> Result<BlobHandle> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Blob(format!("Path has no file name: {}", path.display())))?
            .to_string();
        Ok(self.register(file_name, bytes))
    }

    /// Bytes behind a handle, if it is still live.
    #[must_use]
    pub fn resolve(&self, handle: &BlobHandle) -> Option<&[u8]> {
        self.live.get(&handle.id).map(Vec::as_slice)
    }

    /// Number of live handles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Release every live handle. Returns how many were released by this call.
    ///
    /// Each handle is released at most once; a second call returns 0.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        for (id, _) in self.live.drain() {
            debug!(id, "released blob");
        }
        self.released += count;
        count
    }
}

impl Drop for BlobRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("live", &self.live.len())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = BlobRegistry::new();
        let handle = registry.register("photo.png", vec![1, 2, 3]);

        assert_eq!(handle.file_name(), "photo.png");
        assert_eq!(handle.to_string(), "blob:0/photo.png");
        assert_eq!(registry.resolve(&handle), Some(&[1u8, 2, 3][..]));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut registry = BlobRegistry::new();
        let a = registry.register("same.png", vec![]);
        let b = registry.register("same.png", vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_release_all_is_exactly_once() {
        let mut registry = BlobRegistry::new();
        let handle = registry.register("a.png", vec![0]);
        registry.register("b.png", vec![1]);

        assert_eq!(registry.release_all(), 2);
        assert_eq!(registry.release_all(), 0);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(format!("{registry:?}"), "BlobRegistry { live: 0, released: 2 }");
        assert!(registry.resolve(&handle).is_none());
    }

    #[test]
    fn test_register_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let mut registry = BlobRegistry::new();
        let handle = registry.register_file(&path).unwrap();
        assert_eq!(handle.file_name(), "upload.jpg");
        assert_eq!(registry.resolve(&handle), Some(&b"jpeg-bytes"[..]));
    }
}
