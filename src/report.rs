//! Report rendering: colored human-readable text, or JSON.

use std::fmt::Write as _;
use std::path::Path;

use owo_colors::{OwoColorize as _, Style};

use crate::error::Error;
use crate::types::{LinkError, LinkErrorKind, LinkWarning, LinkWarningKind, Report};

/// Width of the `=` rules framing each section.
const RULE_WIDTH: usize = 60;

/// Output format for the validation report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable report on stdout.
    Json,
    /// Colored, itemized report for terminals.
    #[default]
    Text,
}

/// Terminal styles for each kind of line.
struct Palette {
    /// Emit escape codes at all.
    color: bool,
    /// Broken links and the failure verdict.
    error: Style,
    /// Zero counts and the success verdict.
    ok: Style,
    /// Advisory findings.
    warning: Style,
}

impl Palette {
    /// Build the palette; `color` false renders every line plain.
    fn new(color: bool) -> Self {
        return Self {
            color,
            error: Style::new().red(),
            ok: Style::new().green(),
            warning: Style::new().yellow().bold(),
        };
    }

    /// Style a line as a failure.
    fn error(&self, text: &str) -> String {
        return self.paint(text, self.error);
    }

    /// Style a line as a pass.
    fn ok(&self, text: &str) -> String {
        return self.paint(text, self.ok);
    }

    /// Apply `style` when color is on.
    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            return text.style(style).to_string();
        }
        return text.to_string();
    }

    /// Style a line as advisory.
    fn warning(&self, text: &str) -> String {
        return self.paint(text, self.warning);
    }
}

/// Render the report in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if JSON serialization fails.
pub fn render(report: &Report, root: &Path, format: OutputFormat, color: bool) -> Result<String, Error> {
    return match format {
        OutputFormat::Json => render_json(report),
        OutputFormat::Text => Ok(render_text(report, root, color)),
    };
}

/// Serialize the report as pretty JSON.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn render_json(report: &Report) -> Result<String, Error> {
    let mut value = serde_json::to_value(report)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("broken_links".to_string(), report.broken_count().into());
        object.insert("success".to_string(), report.is_success().into());
    }
    return Ok(serde_json::to_string_pretty(&value)?);
}

/// Render the itemized text report: errors, warnings, summary, verdict.
pub fn render_text(report: &Report, root: &Path, color: bool) -> String {
    let palette = Palette::new(color);
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "Validating markdown links in {}", root.display());
    let _ = writeln!(out, "Found {} markdown files", report.total_documents);
    out.push('\n');

    if !report.errors.is_empty() {
        let heading = format!("{rule}\nERRORS ({})\n{rule}", report.errors.len());
        let _ = writeln!(out, "\n{}\n", palette.error(&heading));
        for error in &report.errors {
            write_error(&mut out, error, &palette);
        }
    }

    if !report.warnings.is_empty() {
        let heading = format!("{rule}\nWARNINGS ({})\n{rule}", report.warnings.len());
        let _ = writeln!(out, "\n{}\n", palette.warning(&heading));
        for warning in &report.warnings {
            write_warning(&mut out, warning, &palette);
        }
    }

    write_summary(&mut out, report, &palette, &rule);
    return out;
}

/// One itemized error block.
fn write_error(out: &mut String, error: &LinkError, palette: &Palette) {
    let title = format!("✗ {}", title_case(error.kind.name()));
    let _ = writeln!(out, "{}", palette.error(&title));
    let _ = writeln!(out, "  File: {}:{}", error.file.display(), error.line);
    let _ = writeln!(out, "  Link: {}", error.link);
    let _ = writeln!(out, "  Text: {}", error.text);
    let _ = writeln!(out, "  {}", error.message);
    match &error.kind {
        LinkErrorKind::BrokenAnchor { available, .. } if !available.is_empty() => {
            let _ = writeln!(out, "  Available anchors: {}...", available.join(", "));
        },
        LinkErrorKind::BrokenLink { expected } => {
            let _ = writeln!(out, "  Expected: {}", expected.display());
        },
        LinkErrorKind::BrokenAnchor { .. } | LinkErrorKind::BrokenExternal { .. } => {},
    }
    out.push('\n');
    return;
}

/// The closing summary with counts and the overall verdict.
fn write_summary(out: &mut String, report: &Report, palette: &Palette, rule: &str) {
    let _ = writeln!(out, "\n{rule}\nSUMMARY\n{rule}");
    let _ = writeln!(out, "Files checked:      {}", report.total_documents);
    let _ = writeln!(out, "Links validated:    {}", report.total_links);
    out.push('\n');

    let broken = report.broken_count();
    if broken > 0 {
        let line = format!("✗ Broken links:     {broken}");
        let _ = writeln!(out, "{}", palette.error(&line));
    } else {
        let _ = writeln!(out, "{}", palette.ok("✓ Broken links:     0"));
    }

    let warnings = report.warnings.len();
    if warnings > 0 {
        let line = format!("⚠ Warnings:         {warnings}");
        let _ = writeln!(out, "{}", palette.warning(&line));
    } else {
        let _ = writeln!(out, "{}", palette.ok("✓ Warnings:         0"));
    }
    let _ = writeln!(out, "{rule}\n");

    if report.is_success() {
        let _ = writeln!(out, "{}", palette.ok("All links are valid!"));
    } else {
        let _ = writeln!(out, "{}", palette.error("Validation failed - please fix broken links"));
    }
    return;
}

/// One itemized warning block.
fn write_warning(out: &mut String, warning: &LinkWarning, palette: &Palette) {
    let title = format!("⚠ {}", title_case(warning.kind.name()));
    let _ = writeln!(out, "{}", palette.warning(&title));
    let _ = writeln!(out, "  File: {}:{}", warning.file.display(), warning.line);
    let _ = writeln!(out, "  Link: {}", warning.link);
    match &warning.kind {
        LinkWarningKind::DirectoryNoSlash { suggestion }
        | LinkWarningKind::MissingMdExtension { suggestion } => {
            let _ = writeln!(out, "  Suggestion: {suggestion}");
        },
        LinkWarningKind::ExternalUnverified { reason } => {
            let _ = writeln!(out, "  Reason: {reason}");
        },
    }
    out.push('\n');
    return;
}

/// `broken_anchor` -> `Broken Anchor`.
fn title_case(snake: &str) -> String {
    return snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            return chars.next().map_or_else(String::new, |first| {
                return first.to_uppercase().chain(chars).collect();
            });
        })
        .collect::<Vec<_>>()
        .join(" ");
}
