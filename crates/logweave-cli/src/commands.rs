use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use logweave_engine::{
    CancelFlag, FileInput, LogInput, LogMerger, MergeReport, ScanMode, SourceCursor,
};
use logweave_types::{component_id, FormatCatalog, TimestampFormat};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::*;
use crate::config;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Detect(args) => cmd_detect(args, &cli.format),
    }
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let output = args.output.clone();
    let report = merge(args)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, &output),
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn merge(args: MergeArgs) -> anyhow::Result<MergeReport> {
    let merge_config = config::resolve(&args)?;
    let inputs = expand_paths(&args.paths, &args.output)?;
    if inputs.is_empty() {
        anyhow::bail!("no log files found in the given paths");
    }

    let catalog = FormatCatalog::new();
    let merger = LogMerger::new(&catalog, merge_config);
    let mut progress = CancelFlag::new();
    let report = merger
        .merge_to_file(&inputs, &args.output, &mut progress)
        .with_context(|| format!("merging into {}", args.output.display()))?;
    debug!(units = progress.units(), "merge progress complete");
    Ok(report)
}

fn print_report(report: &MergeReport, output: &Path) {
    for source in &report.sources {
        if source.status.is_ok() {
            println!(
                "  {} {} ({}) {} records",
                "✓".green(),
                source.name,
                source.component_id.cyan(),
                source.records
            );
        } else {
            println!("  {} {}: {}", "✗".red(), source.name, source.status.to_string().red());
        }
    }
    let format = report
        .common_format
        .map(|f| f.to_string())
        .unwrap_or_else(|| "none".into());
    println!(
        "{} {} records written to {} (format: {})",
        if report.is_success() { "✓".green().bold() } else { "!".yellow().bold() },
        report.records_written.to_string().bold(),
        output.display().to_string().bold(),
        format.cyan()
    );
    if report.cancelled {
        println!("  {}", "merge was cancelled".yellow());
    }
}

/// One row of `logweave detect` output.
#[derive(Debug, Serialize)]
struct Detection {
    name: String,
    component_id: String,
    format: Option<TimestampFormat>,
    error: Option<String>,
}

fn cmd_detect(args: DetectArgs, format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let catalog = FormatCatalog::new();
    let rows: Vec<Detection> = args
        .paths
        .iter()
        .map(|path| detect(&catalog, &FileInput::new(path)))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            for row in &rows {
                match (&row.format, &row.error) {
                    (Some(f), _) => println!(
                        "{}  {}  {}",
                        row.name.bold(),
                        row.component_id.cyan(),
                        f.to_string().green()
                    ),
                    (None, error) => println!(
                        "{}  {}  {}",
                        row.name.bold(),
                        row.component_id.cyan(),
                        error.as_deref().unwrap_or("unknown").red()
                    ),
                }
            }
        }
    }

    Ok(if rows.iter().all(|r| r.format.is_some()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn detect(catalog: &FormatCatalog, input: &FileInput) -> Detection {
    let name = input.display_name().to_string();
    let component_id = component_id(&name).to_string();
    match SourceCursor::from_input(input, catalog, ScanMode::Fast) {
        Ok(cursor) => {
            let format = cursor.format();
            cursor.close();
            Detection {
                name,
                component_id,
                format: Some(format),
                error: None,
            }
        }
        Err(err) => Detection {
            name,
            component_id,
            format: None,
            error: Some(err.to_string()),
        },
    }
}

/// Turn the command-line paths into inputs. Directories contribute their
/// regular files (not recursively) in file name order; the destination is
/// left out of directory listings.
fn expand_paths(paths: &[PathBuf], destination: &Path) -> anyhow::Result<Vec<FileInput>> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(FileInput::new(path));
            continue;
        }
        for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.with_context(|| format!("listing {}", path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if is_destination(entry.path(), destination) {
                debug!(path = %entry.path().display(), "leaving destination out of directory input");
                continue;
            }
            inputs.push(FileInput::new(entry.into_path()));
        }
    }
    Ok(inputs)
}

fn is_destination(path: &Path, destination: &Path) -> bool {
    match (path.canonicalize(), destination.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => path == destination,
    }
}
