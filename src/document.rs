//! Document loading and the per-run anchor cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Error;
use crate::headers::{AnchorSet, extract_headers};

/// Read a markdown document.
///
/// Invalid UTF-8 bytes are dropped, never fatal. `\r\n` and lone `\r` both
/// end a line, so line numbers agree with editors that honor old Mac endings.
///
/// # Errors
///
/// Returns `Error::DocumentRead` if the file cannot be read.
pub fn read_document(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path).map_err(|source| {
        return Error::DocumentRead {
            path: path.to_path_buf(),
            source,
        };
    })?;
    let text: String = bytes.utf8_chunks().map(|chunk| return chunk.valid()).collect();
    return Ok(text.replace("\r\n", "\n").replace('\r', "\n"));
}

/// Anchor sets memoized per document for the duration of one run.
///
/// Documents are immutable snapshots during a run, so a cached set is
/// always identical to a fresh extraction.
#[derive(Debug, Default)]
pub struct AnchorCache {
    /// Anchor sets keyed by the path they were loaded from.
    sets: Mutex<HashMap<PathBuf, Arc<AnchorSet>>>,
}

impl AnchorCache {
    /// Anchors of the document at `path`, reading it on first request.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentRead` if the document cannot be read.
    pub fn anchors(&self, path: &Path) -> Result<Arc<AnchorSet>, Error> {
        if let Some(hit) = self.lock().get(path) {
            return Ok(Arc::clone(hit));
        }

        // Read outside the lock; a racing reader computes the same set.
        let content = read_document(path)?;
        let set = Arc::new(extract_headers(&content));
        tracing::trace!(path = %path.display(), anchors = set.len(), "extracted anchors");
        self.lock().insert(path.to_path_buf(), Arc::clone(&set));
        return Ok(set);
    }

    /// Lock the map, recovering from a poisoned mutex.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<AnchorSet>>> {
        return self.sets.lock().unwrap_or_else(PoisonError::into_inner);
    }
}
