//! Terminal and JSON reporting

use std::path::Path;

use colored::*;
use extscan_core::Indicator;
use extscan_scanner::ScanResult;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Per-session counters, drive the exit code
pub struct Summary {
    pub files: usize,
    pub files_with_hits: usize,
    pub total_hits: usize,
    pub errors: usize,
}

pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    files: usize,
    files_with_hits: usize,
    total_hits: usize,
    errors: usize,
    json_entries: Vec<serde_json::Value>,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            files: 0,
            files_with_hits: 0,
            total_hits: 0,
            errors: 0,
            json_entries: Vec::new(),
        }
    }

    pub fn report_result(&mut self, path: &Path, result: &ScanResult) {
        self.files += 1;
        self.total_hits += result.hits.len();
        if result.has_hits() {
            self.files_with_hits += 1;
        }

        match self.format {
            OutputFormat::Json => {
                self.json_entries.push(json!({
                    "file": path.display().to_string(),
                    "result": result,
                }));
            }
            OutputFormat::Text => {
                if !result.has_hits() && !result.is_file_ignored && !self.verbose {
                    return;
                }
                println!("{}", path.display().to_string().bold());
                if result.is_file_ignored {
                    println!("  {}", "file opted out of scanning".yellow());
                }
                for hit in &result.hits {
                    let indicator = match hit.indicator {
                        Indicator::Strong => "strong".red(),
                        Indicator::Weak => "weak".yellow(),
                    };
                    println!("  {}:{} [{}] {}", "line".dimmed(), hit.line, indicator, hit.message);
                    if !hit.line_content.is_empty() {
                        println!("      {}", hit.line_content.dimmed());
                    }
                    for entry in &hit.changelog_entries {
                        println!(
                            "      {} {} ({})",
                            "->".dimmed(),
                            entry.filename,
                            entry.version
                        );
                    }
                    for unresolved in &hit.unresolved_refs {
                        println!("      {} {}", "unresolved:".yellow(), unresolved);
                    }
                }
                if self.verbose {
                    println!(
                        "  {} effective, {} ignored line(s)",
                        result.effective_code_lines, result.ignored_lines
                    );
                }
            }
        }
    }

    pub fn report_syntax_error(&mut self, path: &Path, message: &str) {
        self.files += 1;
        match self.format {
            OutputFormat::Json => {
                self.json_entries.push(json!({
                    "file": path.display().to_string(),
                    "syntaxError": message,
                }));
            }
            OutputFormat::Text => {
                println!(
                    "{}: {} cannot be scanned: {}",
                    "Warning".yellow(),
                    path.display(),
                    message
                );
            }
        }
    }

    pub fn report_error(&mut self, path: &Path, message: &str) {
        self.files += 1;
        self.errors += 1;
        match self.format {
            OutputFormat::Json => {
                self.json_entries.push(json!({
                    "file": path.display().to_string(),
                    "error": message,
                }));
            }
            OutputFormat::Text => {
                eprintln!("{}: {}: {}", "Error".red(), path.display(), message);
            }
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            files: self.files,
            files_with_hits: self.files_with_hits,
            total_hits: self.total_hits,
            errors: self.errors,
        }
    }

    pub fn finish(&self) {
        match self.format {
            OutputFormat::Json => {
                if let Ok(rendered) = serde_json::to_string_pretty(&self.json_entries) {
                    println!("{}", rendered);
                }
            }
            OutputFormat::Text => {
                let summary = self.summary();
                let line = format!(
                    "{} file(s) scanned, {} hit(s) in {} file(s)",
                    summary.files, summary.total_hits, summary.files_with_hits
                );
                if summary.total_hits > 0 {
                    println!("{}", line.yellow().bold());
                } else {
                    println!("{}", line.green().bold());
                }
            }
        }
    }
}
