//! `conda-tool`: export a conda environment specification

use crate::logging::level_from_count;
use crate::print_output;
use b_tools::Result;
use b_tools::conda::{CondaCli, ExportFormat, render, resolve_target, write_export};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "conda-tool")]
#[command(version, about = "Export a conda environment specification")]
// Each flag maps to an independent export option
#[allow(clippy::struct_excessive_bools)]
pub struct CondaToolArgs {
    /// Name of environment to export. Defaults to current active environment.
    #[arg(value_name = "NAME", conflicts_with = "prefix")]
    pub name: Option<String>,

    /// Full path to environment, that is, the conda prefix
    #[arg(short, long)]
    pub prefix: Option<PathBuf>,

    /// Write output to file instead of printing
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Return output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Remove build strings from conda packages
    #[arg(long)]
    pub no_builds: bool,

    /// Leave the environment prefix out of the output
    #[arg(long)]
    pub no_prefix: bool,

    /// Only include packages that were explicitly requested
    #[arg(long)]
    pub from_history: bool,

    /// Run without changing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Verbosity (-v, -vv, etc)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CondaToolArgs {
    pub fn log_level(&self) -> LevelFilter {
        level_from_count(self.verbose)
    }

    /// Output format: `--json`, else the file extension, else YAML
    pub fn format(&self) -> ExportFormat {
        if self.json {
            ExportFormat::Json
        } else {
            self.file
                .as_deref()
                .map_or(ExportFormat::Yaml, ExportFormat::for_path)
        }
    }
}

/// Export the selected environment and print or save it
///
/// # Errors
/// No environment to export, conda missing or failing, or output errors
pub fn run(args: &CondaToolArgs) -> Result<()> {
    log::debug!("args: {args:?}");
    let env = |key: &str| std::env::var(key).ok();

    let target = resolve_target(args.name.as_deref(), args.prefix.as_deref(), env)?;
    let conda = CondaCli::locate(env)?;
    log::info!("Exporting {target:?} with {}", conda.exe().display());

    let mut spec = conda.export(&target, args.from_history)?;
    if args.no_builds {
        spec = spec.strip_builds();
    }
    if args.no_prefix {
        spec = spec.without_prefix();
    }

    let text = render(&spec, args.format())?;
    match &args.file {
        Some(path) => write_export(path, &text, args.dry_run).map(|_| ()),
        None => print_output(&text),
    }
}
