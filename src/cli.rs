//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Student Insights - spreadsheet to dashboard reporter
///
/// Fetches a published spreadsheet as CSV, summarizes the student records
/// and writes a single-page dashboard with metrics and charts.
///
/// Examples:
///   student-insights
///   student-insights --sheet-id 1JSEnjf6ovLPH-2DqFNdT3aKbLD-3BWBuRhwGycDrhWw
///   student-insights --local ./students.csv --output report.html
///   student-insights --format json --output insights.json
///   student-insights --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Google Sheets document id to fetch
    ///
    /// The sheet must be shared publicly. Defaults to the id in the
    /// config file.
    #[arg(short, long, value_name = "ID", env = "STUDENT_INSIGHTS_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Full CSV export URL (overrides --sheet-id)
    #[arg(short, long, value_name = "URL", conflicts_with = "local")]
    pub url: Option<String>,

    /// Read a local CSV file instead of fetching
    #[arg(long, value_name = "FILE")]
    pub local: Option<PathBuf>,

    /// Output file path for the dashboard
    ///
    /// Defaults to student_insights.html (or the config file's value)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, json)
    #[arg(long, default_value = "html", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .student-insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .student-insights.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Self-contained HTML page (default)
    #[default]
    Html,
    /// JSON aggregates
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref sheet_id) = self.sheet_id {
            if sheet_id.is_empty() {
                return Err("Sheet id must not be empty".to_string());
            }
            if !sheet_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(format!("Sheet id contains invalid characters: {}", sheet_id));
            }
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local file does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_file() {
                return Err(format!("Local path is not a file: {}", local_path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
