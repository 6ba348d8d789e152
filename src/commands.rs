//! The check command: load config, validate, print the report, map the exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::error;
use crate::report::{self, OutputFormat};
use crate::types::Report;
use crate::validator;

/// Exit code when every link resolved.
const EXIT_SUCCESS: u8 = 0;

/// Exit code when at least one link is broken.
const EXIT_BROKEN: u8 = 1;

/// Exit code when the run aborted before producing a report.
pub const EXIT_SCRIPT_ERROR: u8 = 2;

/// Command-line settings for one validation run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Force external link verification on.
    pub check_external: bool,
    /// Emit ANSI colors.
    pub color: bool,
    /// Extra directory names to exclude, on top of the config's set.
    pub exclude: Vec<String>,
    /// Report format.
    pub format: OutputFormat,
    /// Repository root as given (not yet canonicalized).
    pub repo: PathBuf,
}

impl CheckOptions {
    /// Layer the command-line flags over the file config.
    fn apply_to(&self, config: &mut Config) {
        config.check_external |= self.check_external;
        config.exclude_dirs.extend(self.exclude.iter().cloned());
        return;
    }
}

/// Validate the repository once and print the report to stdout.
///
/// # Errors
///
/// Returns `Error::RootNotFound` for a missing root, `Error::TomlDe` for a
/// malformed config, `Error::DocumentRead` for an unreadable document, or
/// `Error::Json` if the JSON report cannot be serialized.
pub fn check(options: &CheckOptions) -> Result<ExitCode, error::Error> {
    let root = validator::canonical_root(&options.repo)?;
    let mut config = Config::load(&root)?;
    options.apply_to(&mut config);
    tracing::debug!(?config, root = %root.display(), "starting validation");

    let report = validator::validate_all(&root, &config)?;
    let rendered = report::render(&report, &root, options.format, options.color)?;
    print!("{rendered}");
    if options.format == OutputFormat::Json {
        println!();
    }

    return Ok(exit_code_for(&report));
}

/// 0 when every link resolved, 1 when any is broken. Warnings never count.
pub fn exit_code_for(report: &Report) -> ExitCode {
    return ExitCode::from(exit_status(report));
}

/// The raw status behind [`exit_code_for`].
fn exit_status(report: &Report) -> u8 {
    if report.is_success() {
        return EXIT_SUCCESS;
    }
    return EXIT_BROKEN;
}
