/// Core domain types for doclinks: link occurrences, findings, and the report.
use std::path::PathBuf;

use serde::Serialize;

/// Parsed from inline markdown link syntax by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// One-based line number of the link in its document.
    pub line: u32,
    /// Display text between the brackets. Informational only.
    pub text: String,
    /// Target reference as written, with any title clause stripped.
    pub url: String,
}

/// A link that fails to resolve. Collected, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkError {
    /// Markdown file containing the link, relative to the repository root.
    pub file: PathBuf,
    /// Kind-specific details.
    #[serde(flatten)]
    pub kind: LinkErrorKind,
    /// One-based line number of the link.
    pub line: u32,
    /// The raw link target.
    pub link: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// Display text of the link.
    pub text: String,
}

/// What went wrong with a broken link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkErrorKind {
    /// The target exists but has no header producing the anchor.
    BrokenAnchor {
        /// Up to five sorted anchors from the target, for diagnostics.
        available: Vec<String>,
        /// The anchor that was looked for, including the leading `#`.
        missing: String,
        /// The target document; `None` for same-document anchors.
        target: Option<PathBuf>,
    },
    /// An external URL answered with an error status.
    BrokenExternal {
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// The target file does not exist, even with the extension appended.
    BrokenLink {
        /// The resolved path that was tried.
        expected: PathBuf,
    },
}

impl LinkErrorKind {
    /// Snake-case name used in JSON output and report headings.
    pub const fn name(&self) -> &'static str {
        return match self {
            LinkErrorKind::BrokenAnchor { .. } => "broken_anchor",
            LinkErrorKind::BrokenExternal { .. } => "broken_external",
            LinkErrorKind::BrokenLink { .. } => "broken_link",
        };
    }
}

/// An advisory finding. Never affects the exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkWarning {
    /// Markdown file containing the link, relative to the repository root.
    pub file: PathBuf,
    /// Kind-specific details.
    #[serde(flatten)]
    pub kind: LinkWarningKind,
    /// One-based line number of the link.
    pub line: u32,
    /// The raw link target.
    pub link: String,
}

/// Why a working link still deserves attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkWarningKind {
    /// The link names a directory without a trailing `/`.
    DirectoryNoSlash {
        /// The link with the separator appended.
        suggestion: String,
    },
    /// An external URL could not be reached at all.
    ExternalUnverified {
        /// Transport-level failure description.
        reason: String,
    },
    /// The link only resolves once the markup extension is appended.
    MissingMdExtension {
        /// The corrected link.
        suggestion: String,
    },
}

impl LinkWarningKind {
    /// Snake-case name used in JSON output and report headings.
    pub const fn name(&self) -> &'static str {
        return match self {
            LinkWarningKind::DirectoryNoSlash { .. } => "directory_no_slash",
            LinkWarningKind::ExternalUnverified { .. } => "external_unverified",
            LinkWarningKind::MissingMdExtension { .. } => "missing_md_extension",
        };
    }
}

/// Outcome of checking one link: at most one error, plus any warnings.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Set when the link is broken. Resolution stops at the first error.
    pub error: Option<LinkError>,
    /// Advisory findings that accompany the primary outcome.
    pub warnings: Vec<LinkWarning>,
}

impl Resolution {
    /// A link that resolved with nothing to report.
    pub fn valid() -> Self {
        return Self::default();
    }

    /// True when the link counts as resolved, warnings or not.
    pub const fn is_valid(&self) -> bool {
        return self.error.is_none();
    }
}

/// Findings for a single document, in link order.
#[derive(Debug, Default)]
pub struct DocumentReport {
    /// Broken links found in this document.
    pub errors: Vec<LinkError>,
    /// Number of link occurrences examined.
    pub links: usize,
    /// Advisory findings for this document.
    pub warnings: Vec<LinkWarning>,
}

impl DocumentReport {
    /// Fold one link's resolution into this document's findings.
    pub fn record(&mut self, resolution: Resolution) {
        self.links = self.links.saturating_add(1);
        if let Some(error) = resolution.error {
            self.errors.push(error);
        }
        self.warnings.extend(resolution.warnings);
        return;
    }
}

/// Aggregate result of a validation run. Success iff there are no errors.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Broken links across all documents, in walker then link order.
    pub errors: Vec<LinkError>,
    /// Number of documents scanned.
    pub total_documents: usize,
    /// Number of link occurrences examined.
    pub total_links: usize,
    /// Advisory findings across all documents.
    pub warnings: Vec<LinkWarning>,
}

impl Report {
    /// Fold one document's findings into the report.
    pub fn absorb(&mut self, document: DocumentReport) {
        self.total_documents = self.total_documents.saturating_add(1);
        self.total_links = self.total_links.saturating_add(document.links);
        self.errors.extend(document.errors);
        self.warnings.extend(document.warnings);
        return;
    }

    /// Number of broken links. Always equal to `errors.len()`.
    pub fn broken_count(&self) -> usize {
        return self.errors.len();
    }

    /// True when no link failed to resolve. Warnings do not count.
    pub fn is_success(&self) -> bool {
        return self.errors.is_empty();
    }
}
