//! `webxml validate`: grammar check for descriptor files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use webxml::descriptor::WebXml;
use webxml::xml::{ValidationReport, read_document};

use crate::format::OutputFormat;

#[derive(Args)]
pub struct ValidateArgs {
    /// Descriptor files (web.xml or web-fragment.xml)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    #[serde(flatten)]
    report: Option<ValidationReport>,
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut model = WebXml::new();
        let entry = match read_document(&text, &mut model) {
            Ok(report) => FileReport {
                path,
                valid: report.is_valid(),
                failure: None,
                report: Some(report),
            },
            Err(e) => FileReport {
                path,
                valid: false,
                failure: Some(e.to_string()),
                report: None,
            },
        };
        reports.push(entry);
    }

    match args.format {
        OutputFormat::Json => println!("{}", args.format.serialize(&reports)?),
        OutputFormat::Text => {
            for entry in &reports {
                print_text(entry);
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    if invalid > 0 {
        bail!("{invalid} of {} descriptor(s) invalid", reports.len());
    }
    Ok(())
}

fn print_text(entry: &FileReport<'_>) {
    let path = entry.path.display();
    if let Some(failure) = &entry.failure {
        eprintln!("{path}: error: {failure}");
        return;
    }
    let Some(report) = &entry.report else {
        return;
    };
    print_diagnostics(entry.path, report);
    if report.is_valid() {
        let kind = report.kind.map_or_else(|| "descriptor".to_owned(), |k| k.to_string());
        let version = report.version.map_or_else(|| "?".to_owned(), |v| v.to_string());
        eprintln!(
            "{path}: ok ({kind} {version}, {} warning(s))",
            report.warnings.len()
        );
    }
}

/// Print `path:line: severity: message` lines for every diagnostic.
pub fn print_diagnostics(path: &Path, report: &ValidationReport) {
    for e in &report.errors {
        eprintln!("{}:{}: error: {}", path.display(), e.line, e.message);
    }
    for w in &report.warnings {
        eprintln!("{}:{}: warning: {}", path.display(), w.line, w.message);
    }
}

/// Read a descriptor file into a fresh model, failing on grammar errors.
pub fn read_descriptor(path: &Path) -> Result<WebXml> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut model = WebXml::new();
    let report = read_document(&text, &mut model)
        .with_context(|| format!("failed to load {}", path.display()))?;
    print_diagnostics(path, &report);
    if !report.is_valid() {
        bail!(
            "{} has {} error(s)\n  To check: webxml validate {}",
            path.display(),
            report.errors.len(),
            path.display()
        );
    }
    Ok(model)
}
