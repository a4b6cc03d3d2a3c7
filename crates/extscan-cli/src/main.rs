//! extscan CLI - PHP extension compatibility scanner
//!
//! Scans extension PHP files for usages of removed or changed framework
//! API, cross-referencing each finding against versioned changelog
//! documents.

mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

use extscan_matchers::MatcherRegistry;
use extscan_scanner::{logging, Scanner, ScannerOptions};
use output::{OutputFormat, Reporter};
use process::{collect_php_files, scan_to_outcome, FileOutcome};

#[derive(Parser)]
#[command(name = "extscan")]
#[command(version = "0.1.0")]
#[command(about = "Scan PHP extensions for removed or changed framework API usage")]
struct Cli {
    /// Files or directories to scan
    #[arg(required_unless_present_any = ["list_matchers", "validate_tables"])]
    paths: Vec<PathBuf>,

    /// Changelog documentation root used to resolve references
    #[arg(long, value_name = "DIR")]
    changelog_root: Option<PathBuf>,

    /// Directory with rule table overrides (<matcher>.json files)
    #[arg(long, value_name = "DIR")]
    tables_dir: Option<PathBuf>,

    /// Treat paths as relative to this extension directory and enforce the
    /// sandbox check
    #[arg(long, value_name = "DIR")]
    extension_root: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    format: String,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Write a session log to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// List registered matchers and exit
    #[arg(long)]
    list_matchers: bool,

    /// Check that every configured changelog reference resolves to exactly
    /// one document, then exit
    #[arg(long, requires = "changelog_root")]
    validate_tables: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log_file {
        let path = logging::init_logger(Some(log_path))?;
        logging::section("extscan session");
        if cli.verbose {
            eprintln!("{}: {}", "Logging to".bold(), path.display());
        }
    }

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::from_str(&cli.format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json",
                cli.format
            )
        })?
    };

    let registry = match &cli.tables_dir {
        Some(dir) => {
            let (registry, issues) = MatcherRegistry::from_tables_dir(dir)?;
            for issue in &issues {
                eprintln!(
                    "{}: table '{}' skipped, using built-in rules: {}",
                    "Warning".yellow(),
                    issue.table,
                    issue.error
                );
                logging::log(&format!(
                    "table override '{}' skipped: {}",
                    issue.table, issue.error
                ));
            }
            registry
        }
        None => MatcherRegistry::builtin()?,
    };

    let scanner = Scanner::new(
        registry,
        ScannerOptions {
            changelog_root: cli.changelog_root.clone(),
            ..ScannerOptions::default()
        },
    );

    if cli.list_matchers {
        println!("{}", "Registered matchers:".bold());
        for (name, description, rules) in scanner.registry().create_set().describe() {
            println!("  {} ({} rules) - {}", name.green(), rules, description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.validate_tables {
        let issues = scanner.validate_tables()?;
        if issues.is_empty() {
            println!(
                "{}",
                "All configured changelog references resolve to exactly one document".green()
            );
            return Ok(ExitCode::SUCCESS);
        }
        for issue in &issues {
            eprintln!("{}: {}: {}", "Error".red(), issue.filename, issue.error);
        }
        return Ok(ExitCode::from(1));
    }

    let (file_paths, missing_paths) = match &cli.extension_root {
        // Sandboxed paths are handed to the scanner unexpanded; the check
        // itself decides what is acceptable
        Some(_) => (cli.paths.clone(), Vec::new()),
        None => collect_php_files(&cli.paths),
    };

    for path in &missing_paths {
        eprintln!(
            "{}: Path does not exist: {}",
            "Warning".yellow(),
            path.display()
        );
    }

    let outcomes: Vec<FileOutcome> = file_paths
        .par_iter()
        .map(|path| scan_to_outcome(&scanner, cli.extension_root.as_deref(), path))
        .collect();

    let mut sorted: Vec<_> = outcomes.into_iter().zip(file_paths.iter()).collect();
    sorted.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);
    for (outcome, path) in sorted {
        match outcome {
            FileOutcome::Scanned(result) => reporter.report_result(path, &result),
            FileOutcome::Syntax(message) => reporter.report_syntax_error(path, &message),
            FileOutcome::Error(message) => reporter.report_error(path, &message),
        }
    }
    reporter.finish();

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if summary.total_hits > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };
    Ok(exit_code)
}
