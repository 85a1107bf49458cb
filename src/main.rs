use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use webxml::config::DEFAULT_CONFIG_FILE;

mod format;
mod merge_cmd;
mod telemetry;
mod validate_cmd;

/// Web application descriptor merge tool
///
/// Combines an application's own web.xml with the web-fragment.xml files of
/// its libraries, plus an optional container baseline, into one effective
/// descriptor. The result does not depend on the order fragments are given.
///
/// PRECEDENCE:
///   main descriptor > library fragments > baseline
///
/// CONFLICTS:
///   - Settings (context params, MIME mappings, ...) that fragments disagree
///     on are dropped and reported; the merge still succeeds.
///   - Servlets and URL patterns that fragments disagree on fail the merge.
///     Declare the contested entry in the main descriptor to resolve it.
///
/// QUICK START:
///
///   webxml validate WEB-INF/web.xml
///   webxml merge WEB-INF/web.xml lib-a/web-fragment.xml lib-b/web-fragment.xml -o effective-web.xml
#[derive(Parser)]
#[command(name = "webxml")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'webxml <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "WEBXML_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a main descriptor with fragment descriptors
    ///
    /// Writes the merged descriptor to stdout (or --output) and reports
    /// dropped settings on stderr. Fails on servlet or URL pattern
    /// conflicts between fragments.
    Merge(merge_cmd::MergeArgs),

    /// Check descriptors against their declared version's grammar
    ///
    /// Reports errors and warnings with line numbers. Fails if any file has
    /// errors.
    Validate(validate_cmd::ValidateArgs),
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Merge(args) => merge_cmd::run(args, &cli.config),
        Commands::Validate(args) => validate_cmd::run(args),
    }
}
