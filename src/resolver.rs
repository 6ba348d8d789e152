//! Link resolution: classify each link and decide whether its target exists.
//!
//! Order of checks for one link:
//! 1. external scheme (`http`, `https`, `mailto`, `ftp`): valid unless probed
//! 2. `#anchor`: must be a header anchor of the source document
//! 3. `path[#anchor]`: the path must exist (retrying with the markup
//!    extension appended), and the anchor must exist in a markup target
//!
//! The first error ends resolution for that link. Warnings ride alongside.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::document::AnchorCache;
use crate::error::Error;
use crate::external::{ExternalProbe, ProbeOutcome};
use crate::types::{
    LinkError, LinkErrorKind, LinkOccurrence, LinkWarning, LinkWarningKind, Resolution,
};

/// Schemes that mark a link as pointing off the filesystem.
const EXTERNAL_SCHEMES: [&str; 4] = ["http", "https", "mailto", "ftp"];

/// Schemes the external probe knows how to verify.
const PROBED_SCHEMES: [&str; 2] = ["http", "https"];

/// How many target anchors to show when an anchor is missing.
const SAMPLE_ANCHORS: usize = 5;

/// Resolves links found in documents under one repository root.
///
/// Shared by reference across worker threads; the only interior state is
/// the anchor cache.
pub struct Resolver<'a> {
    /// Per-run anchor sets, keyed by document path.
    anchors: AnchorCache,
    /// Extension, exclusion, and external-check settings.
    config: &'a Config,
    /// Network verifier; `None` leaves external links unverified.
    probe: Option<&'a dyn ExternalProbe>,
    /// Canonical repository root. Rooted links (`/docs/x.md`) resolve here.
    root: &'a Path,
}

impl<'a> Resolver<'a> {
    /// Build a resolver for documents under `root`, which must be canonical.
    pub fn new(root: &'a Path, config: &'a Config, probe: Option<&'a dyn ExternalProbe>) -> Self {
        return Self {
            anchors: AnchorCache::default(),
            config,
            probe,
            root,
        };
    }

    /// Check one link found in `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentRead` if the source or target document cannot
    /// be read while loading anchors. Broken links are not errors; they are
    /// returned inside the `Resolution`.
    pub fn check_link(&self, source: &Path, link: &LinkOccurrence) -> Result<Resolution, Error> {
        if let Some(scheme) = uri_scheme(&link.url)
            && EXTERNAL_SCHEMES.contains(&scheme.as_str())
        {
            return Ok(self.check_external(source, link, &scheme));
        }

        if link.url.starts_with('#') {
            return self.check_same_document_anchor(source, link);
        }

        return self.check_file_link(source, link);
    }

    /// Rule 1: external links are valid unless a probe says otherwise.
    fn check_external(&self, source: &Path, link: &LinkOccurrence, scheme: &str) -> Resolution {
        let Some(probe) = self.probe else {
            return Resolution::valid();
        };
        if !PROBED_SCHEMES.contains(&scheme) {
            return Resolution::valid();
        }

        return match probe.probe(&link.url) {
            ProbeOutcome::Reachable => Resolution::valid(),
            ProbeOutcome::Status(status) if status >= 400 => Resolution {
                error: Some(self.link_error(
                    source,
                    link,
                    format!("HTTP {status}"),
                    LinkErrorKind::BrokenExternal { status },
                )),
                warnings: Vec::new(),
            },
            ProbeOutcome::Status(_) => Resolution::valid(),
            ProbeOutcome::Unreachable(reason) => Resolution {
                error: None,
                warnings: vec![self.link_warning(
                    source,
                    link,
                    LinkWarningKind::ExternalUnverified { reason },
                )],
            },
        };
    }

    /// Rule 2: `#anchor` must name a header of the source document itself.
    fn check_same_document_anchor(
        &self,
        source: &Path,
        link: &LinkOccurrence,
    ) -> Result<Resolution, Error> {
        let anchors = self.anchors.anchors(source)?;
        if anchors.contains(&link.url) {
            return Ok(Resolution::valid());
        }

        tracing::debug!(source = %source.display(), anchor = %link.url, "same-document anchor missing");
        let kind = LinkErrorKind::BrokenAnchor {
            available: anchors.iter().take(SAMPLE_ANCHORS).cloned().collect(),
            missing: link.url.clone(),
            target: None,
        };
        return Ok(Resolution {
            error: Some(self.link_error(
                source,
                link,
                "Anchor not found in current file".to_string(),
                kind,
            )),
            warnings: Vec::new(),
        });
    }

    /// Rule 3: a file path with an optional anchor.
    fn check_file_link(&self, source: &Path, link: &LinkOccurrence) -> Result<Resolution, Error> {
        let (raw_file, anchor) = split_anchor(&link.url);
        let file_part = percent_decode(raw_file);
        if file_part.is_empty() {
            return Ok(Resolution::valid());
        }

        let mut resolution = Resolution::valid();
        let mut target = self.resolve_target_path(source, &file_part);

        if !target.exists() {
            let with_extension = append_extension(&target, &self.config.dotted_extension());
            if self.config.ends_with_markup_extension(&target) || !with_extension.exists() {
                tracing::debug!(source = %source.display(), target = %target.display(), "file not found");
                resolution.error = Some(self.link_error(
                    source,
                    link,
                    "File not found".to_string(),
                    LinkErrorKind::BrokenLink { expected: target },
                ));
                return Ok(resolution);
            }

            let suggestion = format!(
                "{file_part}{}{}",
                self.config.dotted_extension(),
                anchor.as_deref().unwrap_or_default()
            );
            resolution.warnings.push(self.link_warning(
                source,
                link,
                LinkWarningKind::MissingMdExtension { suggestion },
            ));
            target = with_extension;
        }

        if let Some(anchor) = &anchor
            && target.is_file()
            && self.config.has_markup_extension(&target)
        {
            let anchors = self.anchors.anchors(&target)?;
            if !anchors.contains(anchor) {
                tracing::debug!(target = %target.display(), %anchor, "anchor missing in target");
                let message = format!("Anchor {anchor} not found in target file");
                let kind = LinkErrorKind::BrokenAnchor {
                    available: anchors.iter().take(SAMPLE_ANCHORS).cloned().collect(),
                    missing: anchor.clone(),
                    target: Some(target),
                };
                resolution.error = Some(self.link_error(source, link, message, kind));
                return Ok(resolution);
            }
        }

        if target.is_dir() && !link.url.ends_with('/') {
            let suggestion = format!("{}/", link.url);
            resolution.warnings.push(self.link_warning(
                source,
                link,
                LinkWarningKind::DirectoryNoSlash { suggestion },
            ));
        }

        return Ok(resolution);
    }

    /// Rooted paths join onto the repository root; everything else is
    /// relative to the source document's directory and canonicalized.
    fn resolve_target_path(&self, source: &Path, file_part: &str) -> PathBuf {
        if let Some(rooted) = file_part.strip_prefix('/') {
            // Re-collecting components drops a trailing separator and `.`.
            return self.root.join(rooted.trim_start_matches('/')).components().collect();
        }

        let source_dir = source.parent().unwrap_or(self.root);
        let joined = source_dir.join(file_part);
        return std::fs::canonicalize(&joined).unwrap_or_else(|_| return normalize_path(&joined));
    }

    /// Build an error record for `link` in `source`.
    fn link_error(
        &self,
        source: &Path,
        link: &LinkOccurrence,
        message: String,
        kind: LinkErrorKind,
    ) -> LinkError {
        return LinkError {
            file: self.relative_to_root(source),
            kind,
            line: link.line,
            link: link.url.clone(),
            message,
            text: link.text.clone(),
        };
    }

    /// Build a warning record for `link` in `source`.
    fn link_warning(&self, source: &Path, link: &LinkOccurrence, kind: LinkWarningKind) -> LinkWarning {
        return LinkWarning {
            file: self.relative_to_root(source),
            kind,
            line: link.line,
            link: link.url.clone(),
        };
    }

    /// Path of a document as shown in reports.
    fn relative_to_root(&self, path: &Path) -> PathBuf {
        return path.strip_prefix(self.root).unwrap_or(path).to_path_buf();
    }
}

/// Append `.md` (or the configured extension) to the full path text.
fn append_extension(path: &Path, dotted_extension: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(dotted_extension);
    return PathBuf::from(raw);
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Decode `%XX` escapes. Invalid UTF-8 in the result is replaced.
fn percent_decode(raw: &str) -> String {
    return String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            let can_pop = matches!(components.last(), Some(Component::Normal(_)));
            if can_pop {
                components.pop();
            } else if !matches!(components.last(), Some(Component::RootDir | Component::Prefix(_))) {
                components.push(component);
            }
        },
        other => components.push(other),
    }
    return;
}

/// Split `path#anchor` at the first `#`. The anchor keeps its `#` prefix.
fn split_anchor(url: &str) -> (&str, Option<String>) {
    return match url.split_once('#') {
        Some((file, anchor)) => (file, Some(format!("#{anchor}"))),
        None => (url, None),
    };
}

/// The lowercased URI scheme, if `url` starts with one.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by `:`.
fn uri_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| return c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    return Some(scheme.to_ascii_lowercase());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    /// A temporary repository with a canonical root.
    struct Repo {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    impl Repo {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().canonicalize().unwrap();
            return Self { _dir: dir, root };
        }

        fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            return path;
        }

        fn mkdir(&self, relative: &str) {
            std::fs::create_dir_all(self.root.join(relative)).unwrap();
        }
    }

    fn link(url: &str) -> LinkOccurrence {
        return LinkOccurrence { line: 1, text: "x".to_string(), url: url.to_string() };
    }

    fn check(repo: &Repo, source: &Path, url: &str) -> Resolution {
        let config = Config::default();
        let resolver = Resolver::new(&repo.root, &config, None);
        return resolver.check_link(source, &link(url)).unwrap();
    }

    struct FixedProbe(ProbeOutcome);

    impl ExternalProbe for FixedProbe {
        fn probe(&self, _url: &str) -> ProbeOutcome {
            return self.0.clone();
        }
    }

    #[test]
    fn same_document_anchor_resolves() {
        let repo = Repo::new();
        let a = repo.write("a.md", "# Setup\n[x](#setup)\n");
        assert_eq!(check(&repo, &a, "#setup"), Resolution::valid());
    }

    #[test]
    fn same_document_anchor_missing_is_broken_anchor() {
        let repo = Repo::new();
        let a = repo.write("a.md", "# Setup\n[x](#missing)\n");
        let error = check(&repo, &a, "#missing").error.unwrap();
        assert_eq!(error.kind.name(), "broken_anchor");
        assert_eq!(error.message, "Anchor not found in current file");
        assert_eq!(error.file, PathBuf::from("a.md"));
    }

    #[test]
    fn existing_relative_file_is_valid() {
        let repo = Repo::new();
        let a = repo.write("docs/a.md", "");
        repo.write("docs/b.md", "");
        repo.write("README.md", "");
        assert!(check(&repo, &a, "b.md").is_valid());
        assert!(check(&repo, &a, "./b.md").is_valid());
        assert!(check(&repo, &a, "../README.md").is_valid());
    }

    #[test]
    fn rooted_path_resolves_from_repository_root() {
        let repo = Repo::new();
        let a = repo.write("docs/deep/a.md", "");
        repo.write("guide/intro.md", "");
        assert!(check(&repo, &a, "/guide/intro.md").is_valid());
        assert!(!check(&repo, &a, "guide/intro.md").is_valid());
    }

    #[test]
    fn rooted_path_with_trailing_slash_falls_back_to_extension() {
        let repo = Repo::new();
        let a = repo.write("docs/a.md", "");
        repo.write("guide.md", "");

        for url in ["/guide/", "../guide/"] {
            let resolution = check(&repo, &a, url);
            assert!(resolution.is_valid(), "{url}: {resolution:?}");
            assert!(matches!(
                resolution.warnings.first().map(|w| return &w.kind),
                Some(LinkWarningKind::MissingMdExtension { .. })
            ));
        }
    }

    #[test]
    fn missing_extension_warns_and_resolves() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.write("b.md", "# Intro\n");

        let resolution = check(&repo, &a, "b#intro");
        assert!(resolution.is_valid());
        assert_eq!(
            resolution.warnings.first().map(|w| return w.kind.clone()),
            Some(LinkWarningKind::MissingMdExtension { suggestion: "b.md#intro".to_string() })
        );
    }

    #[test]
    fn missing_file_is_broken_link_with_expected_path() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        let error = check(&repo, &a, "b").error.unwrap();
        assert_eq!(error.message, "File not found");
        assert_eq!(error.kind, LinkErrorKind::BrokenLink { expected: repo.root.join("b") });
    }

    #[test]
    fn missing_markup_file_does_not_retry_extension() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.write("b.md.md", "");
        let resolution = check(&repo, &a, "b.md");
        assert_eq!(resolution.error.map(|e| return e.kind.name()), Some("broken_link"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn cross_document_anchor_missing_lists_five_sorted_samples() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.write("b.md", "# Zeta\n# Alpha\n# Gamma\n# Beta\n# Delta\n# Epsilon\n");

        let error = check(&repo, &a, "b.md#intro").error.unwrap();
        assert_eq!(error.message, "Anchor #intro not found in target file");
        let LinkErrorKind::BrokenAnchor { available, missing, target } = error.kind else {
            panic!("expected broken anchor");
        };
        assert_eq!(available, vec!["#alpha", "#beta", "#delta", "#epsilon", "#gamma"]);
        assert_eq!(missing, "#intro");
        assert_eq!(target, Some(repo.root.join("b.md")));
    }

    #[test]
    fn anchor_on_non_markup_file_is_not_checked() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.write("src/lib.rs", "fn main() {}\n");
        assert!(check(&repo, &a, "src/lib.rs#L10").is_valid());
    }

    #[test]
    fn percent_encoded_paths_are_decoded() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.write("my notes.md", "");
        assert!(check(&repo, &a, "my%20notes.md").is_valid());
    }

    #[test]
    fn empty_file_part_is_valid() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        // `[x]( "title only")` leaves an empty target once the title is stripped.
        assert_eq!(check(&repo, &a, ""), Resolution::valid());
    }

    #[test]
    fn directory_without_slash_warns_once() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.mkdir("docs");

        let resolution = check(&repo, &a, "docs");
        assert!(resolution.is_valid());
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(
            resolution.warnings[0].kind,
            LinkWarningKind::DirectoryNoSlash { suggestion: "docs/".to_string() }
        );
        assert_eq!(check(&repo, &a, "docs/"), Resolution::valid());
    }

    #[test]
    fn external_links_pass_without_probe() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        assert_eq!(check(&repo, &a, "https://example.com/nonexistent"), Resolution::valid());
        assert_eq!(check(&repo, &a, "HTTP://example.com"), Resolution::valid());
        assert_eq!(check(&repo, &a, "mailto:someone@example.com"), Resolution::valid());
        assert_eq!(check(&repo, &a, "ftp://example.com/file"), Resolution::valid());
    }

    #[test]
    fn probe_status_errors_are_broken_external() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        let config = Config::default();
        let probe = FixedProbe(ProbeOutcome::Status(404));
        let resolver = Resolver::new(&repo.root, &config, Some(&probe));

        let resolution = resolver.check_link(&a, &link("https://example.com/gone")).unwrap();
        let error = resolution.error.unwrap();
        assert_eq!(error.kind, LinkErrorKind::BrokenExternal { status: 404 });
        assert_eq!(error.message, "HTTP 404");

        let mailto = resolver.check_link(&a, &link("mailto:a@example.com")).unwrap();
        assert_eq!(mailto, Resolution::valid());
    }

    #[test]
    fn unreachable_probe_only_warns() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        let config = Config::default();
        let probe = FixedProbe(ProbeOutcome::Unreachable("timed out".to_string()));
        let resolver = Resolver::new(&repo.root, &config, Some(&probe));

        let resolution = resolver.check_link(&a, &link("https://example.com")).unwrap();
        assert!(resolution.is_valid());
        assert_eq!(resolution.warnings[0].kind.name(), "external_unverified");
    }

    #[test]
    fn anchor_into_directory_named_like_document_is_not_checked() {
        let repo = Repo::new();
        let a = repo.write("a.md", "");
        repo.mkdir("b.md");
        assert!(check(&repo, &a, "b.md#x").is_valid());
    }

    #[test]
    fn scheme_detection() {
        assert_eq!(uri_scheme("https://x"), Some("https".to_string()));
        assert_eq!(uri_scheme("Mailto:x"), Some("mailto".to_string()));
        assert_eq!(uri_scheme("svn+ssh://x"), Some("svn+ssh".to_string()));
        assert_eq!(uri_scheme("docs/a.md"), None);
        assert_eq!(uri_scheme("1http://x"), None);
        assert_eq!(uri_scheme(":x"), None);
        assert_eq!(uri_scheme("a b:c"), None);
    }

    #[test]
    fn anchor_split_uses_first_hash() {
        assert_eq!(split_anchor("a.md#b#c"), ("a.md", Some("#b#c".to_string())));
        assert_eq!(split_anchor("a.md"), ("a.md", None));
        assert_eq!(split_anchor("a.md#"), ("a.md", Some("#".to_string())));
    }

    #[test]
    fn normalization_is_lexical() {
        assert_eq!(normalize_path(Path::new("/r/docs/../a/./b.md")), PathBuf::from("/r/a/b.md"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }
}
