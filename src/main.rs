mod commands;
mod config;
mod diagnostics;
mod document;
mod error;
mod external;
mod headers;
mod report;
mod resolver;
mod scanner;
mod types;
mod validator;
mod walker;
mod watch;

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::{CheckOptions, EXIT_SCRIPT_ERROR};
use crate::report::OutputFormat;

#[derive(Parser)]
#[command(
    name = "doclinks",
    version,
    about = "Validate relative links and header anchors in markdown",
    after_help = "Exit codes: 0 all links valid, 1 broken links found, 2 script error"
)]
struct Cli {
    /// Check external HTTP(S) links (requires network)
    #[arg(long)]
    check_external: bool,

    /// Additional directory name to skip (repeatable)
    #[arg(long, value_name = "DIR")]
    exclude: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Repository root (default: current directory)
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(long, short)]
    verbose: bool,

    /// Re-run validation whenever a file under the root changes
    #[arg(long)]
    watch: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = CheckOptions {
        check_external: cli.check_external,
        color: !cli.no_color && std::io::stdout().is_terminal(),
        exclude: cli.exclude,
        format: cli.format,
        repo: cli.repo.unwrap_or_else(|| return PathBuf::from(".")),
    };

    let result = if cli.watch {
        watch::run(&options)
    } else {
        commands::check(&options)
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e, options.color);
            ExitCode::from(EXIT_SCRIPT_ERROR)
        },
    };
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    return;
}
