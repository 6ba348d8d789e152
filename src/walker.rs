//! Repository walk: find every markdown document under the root.

use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;

/// Find all markup documents under `root`, sorted by path.
///
/// Directories named in the config's exclusion set are pruned wherever they
/// appear below the root. Unreadable directory entries are skipped.
pub fn find_documents(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut documents: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| return !is_excluded(root, entry, config))
        .filter_map(|entry| {
            return entry
                .inspect_err(|e| tracing::warn!("skipping unreadable entry: {e}"))
                .ok();
        })
        .filter(|entry| return is_document(entry.path(), config))
        .map(DirEntry::into_path)
        .collect();

    documents.sort();
    tracing::debug!(count = documents.len(), root = %root.display(), "found documents");
    return documents;
}

/// True when the entry sits in, or is, an excluded directory.
fn is_excluded(root: &Path, entry: &DirEntry, config: &Config) -> bool {
    let relative = entry.path().strip_prefix(root).unwrap_or_else(|_| return entry.path());
    return relative.components().any(|component| {
        return match component {
            Component::Normal(name) => name.to_str().is_some_and(|n| return config.is_excluded_dir(n)),
            _ => false,
        };
    });
}

/// A regular file (symlinks followed) carrying the markup extension.
fn is_document(path: &Path, config: &Config) -> bool {
    return config.has_markup_extension(path) && path.is_file();
}
