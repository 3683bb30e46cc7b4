//! CSV export fetching and parsing.
//!
//! One attempt, no retry: a network error, a non-success status or a
//! malformed export all surface as a `FetchError`, and an export without
//! data rows as `PipelineError::EmptyResult`.

use crate::error::{FetchError, PipelineError};
use crate::models::{CellValue, RecordTable};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where the record table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// CSV export fetched over HTTP(S).
    Remote(String),
    /// CSV file on disk.
    Local(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{}", url),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// HTTP client for the spreadsheet export.
pub struct Fetcher {
    client: reqwest::Client,
    show_progress: bool,
}

impl Fetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout_seconds: u64, show_progress: bool) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(client, show_progress))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client, show_progress: bool) -> Self {
        Self {
            client,
            show_progress,
        }
    }

    /// Download the body of `url` as text.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching spreadsheet export: {}", url);

        let spinner = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Downloading spreadsheet...");
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let result = self.download(url).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let body = result?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body)
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// Load the record table from `source`.
///
/// Fails with `EmptyResult` when the export parses but has no data rows.
pub async fn load(source: &DataSource, fetcher: &Fetcher) -> Result<RecordTable, PipelineError> {
    let text = match source {
        DataSource::Remote(url) => fetcher.fetch(url).await?,
        DataSource::Local(path) => {
            info!("Reading local export: {}", path.display());
            std::fs::read_to_string(path).map_err(|source| FetchError::Read {
                path: path.clone(),
                source,
            })?
        }
    };

    let table = parse_csv(&text)?;
    info!(
        "Loaded {} rows with {} columns",
        table.len(),
        table.columns().len()
    );

    if table.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    Ok(table)
}

/// Parse CSV text whose first record is the header row.
///
/// Short rows are padded with missing cells; rows with more fields than the
/// header are rejected.
pub fn parse_csv(text: &str) -> Result<RecordTable, FetchError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let n_cols = headers.len();
    debug!("CSV header: {:?}", headers);

    let mut table = RecordTable::new(headers);

    for result in rdr.records() {
        let record = result?;

        if record.len() > n_cols {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(FetchError::Malformed(format!(
                "line {}: expected {} fields, saw {}",
                line,
                n_cols,
                record.len()
            )));
        }

        table.push_row(record.iter().map(CellValue::parse).collect());
    }

    Ok(table)
}
