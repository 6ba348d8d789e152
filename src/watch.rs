//! File watcher: runs `check` on startup, then re-runs on document changes.

use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, CheckOptions, EXIT_SCRIPT_ERROR};
use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::validator;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals on changes outside excluded dirs.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    root: &Path,
    excluded: BTreeSet<String>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    let root = root.to_path_buf();
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return !is_in_excluded_dir(&root, p, &excluded))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch {
            reason: e.to_string(),
        };
    });
}

/// True when any component below `root` names an excluded directory.
fn is_in_excluded_dir(root: &Path, path: &Path, excluded: &BTreeSet<String>) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative.components().any(|c| {
        return matches!(c, Component::Normal(name) if name.to_str().is_some_and(|n| return excluded.contains(n)));
    });
}

/// Entry point for watch mode.
///
/// Runs an initial check, then watches the repository and re-checks on
/// changes. Returns the exit code of the last run when the channel closes.
///
/// # Errors
///
/// Returns errors from root resolution, config loading, or watcher setup.
pub fn run(options: &CheckOptions) -> Result<ExitCode, error::Error> {
    let root = validator::canonical_root(&options.repo)?;

    eprintln!("watch: initial check");
    let mut last_code = run_check(options);

    let mut config = Config::load(&root)?;
    config.exclude_dirs.extend(options.exclude.iter().cloned());

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, &root, config.exclude_dirs)?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| return error::Error::Watch { reason: e.to_string() })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(options);
    }

    return Ok(last_code);
}

/// Run check once and print the result. Fatal errors print a diagnostic
/// and map to the script-error code instead of ending the watch.
fn run_check(options: &CheckOptions) -> ExitCode {
    return match commands::check(options) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e, options.color);
            ExitCode::from(EXIT_SCRIPT_ERROR)
        },
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn excluded_dir_events_are_ignored() {
        let excluded: BTreeSet<String> = [".git".to_string()].into_iter().collect();
        let root = Path::new("/repo");
        assert!(is_in_excluded_dir(root, Path::new("/repo/.git/index"), &excluded));
        assert!(!is_in_excluded_dir(root, Path::new("/repo/docs/a.md"), &excluded));
    }
}
