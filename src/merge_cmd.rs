//! `webxml merge`: merge a main descriptor with fragments and a baseline.
//!
//! Loads every descriptor (grammar errors abort), marks the baseline as
//! overridable, merges, optionally re-validates the serialized result, and
//! writes it out. See [`webxml::merge`] for the precedence rules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use tracing::info;
use webxml::config::ToolConfig;
use webxml::descriptor::WebXml;
use webxml::merge::{ConflictRecord, FragmentSet};
use webxml::version::SpecVersion;
use webxml::xml::read_document;

use crate::format::OutputFormat;
use crate::validate_cmd::read_descriptor;

#[derive(Args)]
pub struct MergeArgs {
    /// The application's own descriptor (WEB-INF/web.xml)
    main: PathBuf,

    /// Fragment descriptors (web-fragment.xml), in any order
    fragments: Vec<PathBuf>,

    /// Baseline descriptor merged below every fragment (overrides [base] path)
    #[arg(long)]
    base: Option<PathBuf>,

    /// Write the merged descriptor here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Report format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

/// JSON report for `--format json`.
#[derive(Serialize)]
struct MergeSummary<'a> {
    main: &'a Path,
    fragments: &'a [PathBuf],
    baseline: Option<&'a Path>,
    version: SpecVersion,
    clean: bool,
    conflicts: &'a [ConflictRecord],
    output: Option<&'a Path>,
    /// The merged document, when it is not written to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a str>,
}

pub fn run(args: &MergeArgs, config_path: &Path) -> Result<()> {
    let config = ToolConfig::load(config_path)?;

    let mut main = read_descriptor(&args.main)?;
    let mut fragments = FragmentSet::new();
    for path in &args.fragments {
        let id = fragments.insert(read_descriptor(path)?);
        info!(%id, path = %path.display(), "fragment loaded");
    }

    let baseline = args
        .base
        .clone()
        .or_else(|| config.base.resolve_path(config_dir(config_path)));
    if let Some(path) = &baseline {
        let mut base = read_descriptor(path).context("loading baseline descriptor")?;
        config.base.apply(&mut base);
        let id = fragments.insert(base);
        info!(%id, path = %path.display(), "baseline loaded");
    }

    let report = main
        .merge_with_report(&fragments)
        .with_context(|| format!("merge into {} failed", args.main.display()))?;

    if let Some(version) = config.output.version {
        main.set_spec_version(version);
    }
    let document = main.to_document();

    if config.output.validate {
        let mut check = WebXml::new();
        let validation =
            read_document(&document, &mut check).context("re-reading merged descriptor")?;
        if !validation.is_valid() {
            bail!(
                "merged descriptor does not validate:\n{validation}  To fix: set output.validate = false to write it anyway"
            );
        }
    }

    if let Some(out) = &args.output {
        std::fs::write(out, &document)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }

    match args.format {
        OutputFormat::Text => {
            for conflict in &report.conflicts {
                eprintln!("conflict: {conflict}");
            }
            if args.output.is_none() {
                print!("{document}");
            }
        }
        OutputFormat::Json => {
            let summary = MergeSummary {
                main: &args.main,
                fragments: &args.fragments,
                baseline: baseline.as_deref(),
                version: main.spec_version(),
                clean: report.is_clean(),
                conflicts: &report.conflicts,
                output: args.output.as_deref(),
                document: args.output.is_none().then_some(document.as_str()),
            };
            println!("{}", args.format.serialize(&summary)?);
        }
    }

    if config.merge.fail_on_conflict && !report.is_clean() {
        bail!(
            "{} conflicting setting(s) dropped from the merged descriptor\n  \
             To fix: declare the contested keys in {}, or set merge.fail_on_conflict = false",
            report.conflicts.len(),
            args.main.display()
        );
    }
    Ok(())
}

fn config_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
