//! Settings from `.doclinks.toml`, with defaults when the file is absent.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Directory names skipped by default: VCS metadata and dependency caches.
const DEFAULT_EXCLUDE_DIRS: [&str; 4] = [".git", "node_modules", ".venv", "venv"];

/// Markup extension, without the leading dot.
const DEFAULT_EXTENSION: &str = "md";

/// Per-request timeout for external link verification.
const DEFAULT_EXTERNAL_TIMEOUT_SECS: u64 = 10;

/// Name of the optional config file at the repository root.
pub const CONFIG_FILE: &str = ".doclinks.toml";

/// Validation settings, loaded from `.doclinks.toml` and overridden by flags.
/// Passed by reference to the walker and resolver; nothing reads globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Verify `http`/`https` links over the network.
    pub check_external: bool,
    /// Directory names pruned from the walk wherever they appear.
    pub exclude_dirs: BTreeSet<String>,
    /// Markup file extension, without the leading dot.
    pub extension: String,
    /// Bound on each external verification request.
    pub external_timeout: Duration,
}

/// Raw TOML structure for `.doclinks.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DoclinksTomlConfig {
    /// Overrides the external checking default.
    #[serde(default)]
    check_external: Option<bool>,
    /// Replaces the default exclusion set when present.
    #[serde(default)]
    exclude: Option<Vec<String>>,
    /// Overrides the markup extension.
    #[serde(default)]
    extension: Option<String>,
    /// Overrides the external request timeout, in seconds.
    #[serde(default)]
    external_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            check_external: false,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(ToString::to_string).collect(),
            extension: DEFAULT_EXTENSION.to_string(),
            external_timeout: Duration::from_secs(DEFAULT_EXTERNAL_TIMEOUT_SECS),
        };
    }
}

impl Config {
    /// Load config from `.doclinks.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. A file that exists but is
    /// malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        tracing::debug!(path = %path.display(), "loading config");
        let raw: DoclinksTomlConfig = toml::from_str(&content)?;
        return Ok(Self::from_raw(raw));
    }

    /// Layer file values over the defaults.
    fn from_raw(raw: DoclinksTomlConfig) -> Self {
        let defaults = Self::default();
        return Self {
            check_external: raw.check_external.unwrap_or(defaults.check_external),
            exclude_dirs: raw
                .exclude
                .map_or(defaults.exclude_dirs, |dirs| return dirs.into_iter().collect()),
            extension: raw
                .extension
                .map_or(defaults.extension, |ext| return ext.trim_start_matches('.').to_string()),
            external_timeout: raw
                .external_timeout_secs
                .map_or(defaults.external_timeout, Duration::from_secs),
        };
    }

    /// Whether the path's extension is exactly the markup extension.
    pub fn has_markup_extension(&self, path: &Path) -> bool {
        return path.extension().is_some_and(|ext| return ext == self.extension.as_str());
    }

    /// Whether the path's textual form already ends in `.<extension>`.
    pub fn ends_with_markup_extension(&self, path: &Path) -> bool {
        return path.to_string_lossy().ends_with(&self.dotted_extension());
    }

    /// The extension with its leading dot, e.g. `.md`.
    pub fn dotted_extension(&self) -> String {
        return format!(".{}", self.extension);
    }

    /// Whether a directory with this name is pruned from the walk.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        return self.exclude_dirs.contains(name);
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.check_external);
        assert_eq!(config.extension, "md");
        assert!(config.is_excluded_dir(".git"));
        assert!(config.is_excluded_dir("node_modules"));
        assert!(config.is_excluded_dir(".venv"));
        assert!(config.is_excluded_dir("venv"));
        assert!(!config.is_excluded_dir("docs"));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "check_external = true\nexclude = [\"target\"]\nextension = \".markdown\"\nexternal_timeout_secs = 3\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(config.check_external);
        assert!(config.is_excluded_dir("target"));
        assert!(!config.is_excluded_dir(".git"));
        assert_eq!(config.extension, "markdown");
        assert_eq!(config.external_timeout, Duration::from_secs(3));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = 5\n").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn extension_checks() {
        let config = Config::default();
        assert!(config.has_markup_extension(Path::new("docs/a.md")));
        assert!(!config.has_markup_extension(Path::new("docs/a.mdx")));
        assert!(config.ends_with_markup_extension(Path::new("docs/a.md")));
        assert!(!config.ends_with_markup_extension(Path::new("docs/a")));
    }
}
