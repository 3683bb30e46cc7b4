//! Student Insights - spreadsheet-to-dashboard reporter
//!
//! A CLI tool that fetches a published Google Sheet as CSV, summarizes
//! student demographics and writes a single-page dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (fetch, parse, config, write failure, etc.)
//!   2 - The spreadsheet had no data rows

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use error::PipelineError;
use models::{Report, Section};
use source::{DataSource, Fetcher};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Student Insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let exit_code = run_dashboard(&args, &config).await;
    std::process::exit(exit_code);
}

/// Handle --init-config: generate a default .student-insights.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the sheet, column names, titles, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                info!("Loaded default config from {}", CONFIG_FILE_NAME);
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}", e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Run the dashboard workflow and write whatever page the outcome calls for.
/// Returns the process exit code.
async fn run_dashboard(args: &Args, config: &Config) -> i32 {
    let output = PathBuf::from(&config.general.output);

    let source = match args.local {
        Some(ref local) => DataSource::Local(local.clone()),
        None => DataSource::Remote(config.source.export_url()),
    };

    if !args.quiet {
        println!("📥 Loading spreadsheet: {}", source);
    }

    let result = match Fetcher::new(config.source.timeout_seconds, !args.quiet) {
        Ok(fetcher) => pipeline::run(config, &source, &fetcher).await,
        Err(e) => Err(PipelineError::from(e)),
    };

    let result = result.and_then(|report| {
        let content = match args.format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Html => report::generate_html_report(&report, config),
        };
        pipeline::write_output(&output, &content)?;
        Ok(report)
    });

    match result {
        Ok(report) => {
            print_summary(&report, config, args.quiet);
            if !args.quiet {
                println!("\n✅ Dashboard saved to: {}", output.display());
            }
            0
        }
        Err(e) if e.is_empty_result() => {
            warn!("{}", e);
            eprintln!("\n⚠️  {}", e);
            if args.format == OutputFormat::Html {
                write_notice(&output, &report::generate_empty_page(config));
            }
            2
        }
        Err(e) => {
            error!("Dashboard failed at {} stage: {}", e.stage(), e);
            eprintln!("\n❌ Error: {}", e);
            eprintln!("   {}", e.hint());
            if args.format == OutputFormat::Html {
                write_notice(&output, &report::generate_error_page(config, &e));
            }
            1
        }
    }
}

/// Best-effort write of an error or warning page.
fn write_notice(path: &std::path::Path, content: &str) {
    match pipeline::write_output(path, content) {
        Ok(()) => info!("Notice page written to {}", path.display()),
        Err(e) => warn!("{}", e),
    }
}

/// Print what was rendered.
fn print_summary(report: &Report, config: &Config, quiet: bool) {
    if quiet {
        return;
    }

    let insights = &report.insights;
    let top_courses = config.dashboard.top_courses;

    println!("\n📊 Dashboard Summary:");
    println!(
        "   {}: {}",
        Section::TotalStudents.title(top_courses),
        report::format::format_thousands(insights.total_students)
    );
    if let Some(avg) = insights.average_allowance {
        println!(
            "   {}: {}",
            Section::AverageAllowance.title(top_courses),
            report::format::format_currency(&config.dashboard.currency_symbol, avg)
        );
    }
    if let Some(levels) = insights.year_levels {
        println!("   {}: {}", Section::YearLevels.title(top_courses), levels);
    }
    if !insights.skipped.is_empty() {
        println!("   Skipped (column missing):");
        for section in &insights.skipped {
            println!("     - {}", section.title(top_courses));
        }
    }
    if config.general.verbose {
        println!("   Columns: {}", report.metadata.columns.join(", "));
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}
