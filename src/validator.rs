//! Validation coordinator: walk, extract, resolve, and fold into a report.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::document::read_document;
use crate::error::Error;
use crate::external::{ExternalProbe, HttpProbe};
use crate::resolver::Resolver;
use crate::scanner::extract_links;
use crate::types::{DocumentReport, Report};
use crate::walker::find_documents;

/// Canonicalize the repository root, rejecting anything that isn't a directory.
///
/// # Errors
///
/// Returns `Error::RootNotFound` if the path does not exist or is not a directory.
pub fn canonical_root(root: &Path) -> Result<PathBuf, Error> {
    let not_found = || return Error::RootNotFound { path: root.to_path_buf() };
    let canonical = std::fs::canonicalize(root).map_err(|_err| return not_found())?;
    if !canonical.is_dir() {
        return Err(not_found());
    }
    return Ok(canonical);
}

/// Validate every markdown document under `root`.
///
/// Documents are checked in parallel; results are folded in walker order,
/// so the report is identical from run to run over an unchanged tree.
///
/// # Errors
///
/// Returns `Error::RootNotFound` for a missing root, or `Error::DocumentRead`
/// if any document cannot be read. Either aborts the whole run.
pub fn validate_all(root: &Path, config: &Config) -> Result<Report, Error> {
    let root = canonical_root(root)?;
    let http_probe = config.check_external.then(|| return HttpProbe::new(config.external_timeout));
    let probe = http_probe.as_ref().map(|p| return p as &dyn ExternalProbe);
    let resolver = Resolver::new(&root, config, probe);

    let documents = find_documents(&root, config);
    let per_document: Vec<DocumentReport> = documents
        .par_iter()
        .map(|document| return validate_document(&resolver, document))
        .collect::<Result<Vec<_>, Error>>()?;

    let report = per_document.into_iter().fold(Report::default(), |mut report, document| {
        report.absorb(document);
        return report;
    });
    tracing::debug!(
        documents = report.total_documents,
        links = report.total_links,
        broken = report.broken_count(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    return Ok(report);
}

/// Check every link in one document, in extraction order.
///
/// # Errors
///
/// Returns `Error::DocumentRead` if this document or a link target cannot be read.
fn validate_document(resolver: &Resolver<'_>, path: &Path) -> Result<DocumentReport, Error> {
    let content = read_document(path)?;
    let links = extract_links(&content);
    tracing::trace!(path = %path.display(), links = links.len(), "validating document");

    let mut document = DocumentReport::default();
    for link in &links {
        let resolution = resolver.check_link(path, link)?;
        if !resolution.is_valid() {
            tracing::debug!(path = %path.display(), line = link.line, url = %link.url, "broken link");
        }
        document.record(resolution);
    }
    return Ok(document);
}
