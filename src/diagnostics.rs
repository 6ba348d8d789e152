//! Markdown-formatted diagnostics for fatal errors, printed to stderr.

use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render a fatal error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error, color: bool) {
    let md = render_error(e);
    for line in md.lines() {
        if color && line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render a fatal error as a short markdown diagnostic.
///
/// Fatal errors replace the report entirely, so each block says what
/// happened and how to get a full run.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::DocumentRead { path, source } => render_document_read(path, source),
        Error::RootNotFound { path } => render_root_not_found(path),
        Error::TomlDe(e) => render_invalid_config(e),
        Error::Watch { reason } => render_watch(reason),
        Error::Io(_) | Error::Json(_) => render_generic(e),
    }
}

fn render_document_read(path: &std::path::Path, source: &std::io::Error) -> String {
    format!("\
# Error: Unreadable Document

Could not read `{}`: {source}

Validation stopped before a report could be produced.
", path.display())
}

fn render_generic(e: &Error) -> String {
    format!("\
# Error

{e}
")
}

fn render_invalid_config(e: &toml::de::Error) -> String {
    format!("\
# Error: Invalid {CONFIG_FILE}

{e}

## Fix

Correct the file, or delete it to use the defaults.
")
}

fn render_root_not_found(path: &std::path::Path) -> String {
    format!("\
# Error: Repository Root Not Found

`{}` does not exist or is not a directory.

## Fix

Pass an existing directory:

    doclinks --repo path/to/repo
", path.display())
}

fn render_watch(reason: &str) -> String {
    format!("\
# Error: Watch Failed

{reason}

## Fix

Run without `--watch` for a one-shot check.
")
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn root_not_found_names_the_path() {
        let md = render_error(&Error::RootNotFound { path: PathBuf::from("/nope") });
        assert!(md.starts_with("# Error: Repository Root Not Found"));
        assert!(md.contains("`/nope`"));
    }

    #[test]
    fn document_read_includes_cause() {
        let md = render_error(&Error::DocumentRead {
            path: PathBuf::from("docs/a.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(md.contains("`docs/a.md`"));
        assert!(md.contains("denied"));
    }
}
