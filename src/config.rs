//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.student-insights.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".student-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Expected column names.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Field normalization settings.
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Dashboard presentation settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Print extra detail (column list) in the console summary.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "student_insights.html".to_string()
}

/// Where the spreadsheet export comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Google Sheets document id.
    #[serde(default = "default_sheet_id")]
    pub sheet_id: String,

    /// Full CSV export URL; takes precedence over `sheet_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet_id: default_sheet_id(),
            url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_sheet_id() -> String {
    "1JSEnjf6ovLPH-2DqFNdT3aKbLD-3BWBuRhwGycDrhWw".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl SourceConfig {
    /// The URL to fetch: explicit `url` or the sheet's CSV export link.
    pub fn export_url(&self) -> String {
        match self.url {
            Some(ref url) => url.clone(),
            None => format!(
                "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
                self.sheet_id
            ),
        }
    }
}

/// Column names the dashboard looks for. Every one of them is optional in the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_residence")]
    pub residence: String,

    #[serde(default = "default_course")]
    pub course: String,

    /// Normalized before aggregation.
    #[serde(default = "default_college")]
    pub college: String,

    #[serde(default = "default_year_level")]
    pub year_level: String,

    /// Numeric monthly amount.
    #[serde(default = "default_allowance")]
    pub allowance: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            residence: default_residence(),
            course: default_course(),
            college: default_college(),
            year_level: default_year_level(),
            allowance: default_allowance(),
        }
    }
}

fn default_residence() -> String {
    "Residence".to_string()
}

fn default_course() -> String {
    "Course".to_string()
}

fn default_college() -> String {
    "College".to_string()
}

fn default_year_level() -> String {
    "Year Level".to_string()
}

fn default_allowance() -> String {
    "Monthly Allowance".to_string()
}

/// Field normalizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Regex whose first capture group replaces the cell text.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
        }
    }
}

fn default_pattern() -> String {
    r"\((.*?)\)".to_string()
}

/// Dashboard presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Browser tab title.
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Heading at the top of the page.
    #[serde(default = "default_title")]
    pub title: String,

    /// Prefix for monetary amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Number of allowance histogram bins.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// How many courses the course chart shows.
    #[serde(default = "default_top_courses")]
    pub top_courses: usize,

    /// How many colleges the college chart shows.
    #[serde(default = "default_top_colleges")]
    pub top_colleges: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: default_page_title(),
            title: default_title(),
            currency_symbol: default_currency_symbol(),
            histogram_bins: default_histogram_bins(),
            top_courses: default_top_courses(),
            top_colleges: default_top_colleges(),
        }
    }
}

fn default_page_title() -> String {
    "Student Demographics".to_string()
}

fn default_title() -> String {
    "Student Insights".to_string()
}

fn default_currency_symbol() -> String {
    "₱".to_string()
}

fn default_histogram_bins() -> usize {
    20
}

fn default_top_courses() -> usize {
    10
}

fn default_top_colleges() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.dashboard.histogram_bins == 0 {
            anyhow::bail!("dashboard.histogram_bins must be at least 1");
        }
        if self.dashboard.top_courses == 0 {
            anyhow::bail!("dashboard.top_courses must be at least 1");
        }
        if self.dashboard.top_colleges == 0 {
            anyhow::bail!("dashboard.top_colleges must be at least 1");
        }
        if self.source.timeout_seconds == 0 {
            anyhow::bail!("source.timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sheet_id) = args.sheet_id {
            self.source.sheet_id = sheet_id.clone();
            // An explicit sheet id beats a URL left over in the config file
            self.source.url = None;
        }
        if let Some(ref url) = args.url {
            self.source.url = Some(url.clone());
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.columns.college, "College");
        assert_eq!(config.columns.allowance, "Monthly Allowance");
        assert_eq!(config.dashboard.histogram_bins, 20);
        assert_eq!(config.dashboard.top_courses, 10);
        assert_eq!(config.dashboard.top_colleges, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_export_url() {
        let mut source = SourceConfig::default();
        assert_eq!(
            source.export_url(),
            "https://docs.google.com/spreadsheets/d/1JSEnjf6ovLPH-2DqFNdT3aKbLD-3BWBuRhwGycDrhWw/export?format=csv"
        );

        source.url = Some("http://localhost:8080/data.csv".to_string());
        assert_eq!(source.export_url(), "http://localhost:8080/data.csv");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "dashboard.html"
verbose = true

[source]
sheet_id = "abc123"
timeout_seconds = 5

[columns]
allowance = "Weekly Allowance"

[dashboard]
currency_symbol = "$"
histogram_bins = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "dashboard.html");
        assert!(config.general.verbose);
        assert_eq!(config.source.sheet_id, "abc123");
        assert_eq!(config.source.timeout_seconds, 5);
        assert_eq!(config.columns.allowance, "Weekly Allowance");
        // Unset keys keep their defaults
        assert_eq!(config.columns.residence, "Residence");
        assert_eq!(config.dashboard.currency_symbol, "$");
        assert_eq!(config.dashboard.histogram_bins, 10);
        assert_eq!(config.dashboard.top_courses, 10);
        assert_eq!(config.normalize.pattern, r"\((.*?)\)");
    }

    #[test]
    fn test_validate_rejects_zero_bins() {
        let mut config = Config::default();
        config.dashboard.histogram_bins = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[dashboard]\ntop_colleges = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.dashboard.top_colleges, 3);

        std::fs::write(&path, "[dashboard]\ntop_colleges = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[columns]"));
        assert!(toml_str.contains("[dashboard]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.normalize.pattern, r"\((.*?)\)");
    }
}
