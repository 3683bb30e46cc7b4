//! Pipeline error types.
//!
//! Every failure is tagged with the stage it came from so callers can tell
//! a fetch problem from a rendering problem, while the user still sees a
//! single message and one remediation hint.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Hint shown under every failure message.
pub const REMEDIATION_HINT: &str = "Check if the Google Sheet ID is correct and publicly accessible";

/// Warning shown when the export has no data rows.
pub const EMPTY_RESULT_MESSAGE: &str = "No data found in the spreadsheet";

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Normalize,
    Aggregate,
    Render,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Normalize => write!(f, "normalize"),
            Stage::Aggregate => write!(f, "aggregate"),
            Stage::Render => write!(f, "render"),
            Stage::Write => write!(f, "write"),
        }
    }
}

/// Failure to obtain or parse the CSV export.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for FetchError {
    fn from(e: csv::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Any failure of the fetch → normalize → aggregate → render run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{}", EMPTY_RESULT_MESSAGE)]
    EmptyResult,

    #[error("invalid normalization pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid dashboard setting: {0}")]
    InvalidSetting(String),

    #[error("failed to render dashboard: {0}")]
    Render(String),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) | PipelineError::EmptyResult => Stage::Load,
            PipelineError::InvalidPattern(_) => Stage::Normalize,
            PipelineError::InvalidSetting(_) => Stage::Aggregate,
            PipelineError::Render(_) => Stage::Render,
            PipelineError::Write { .. } => Stage::Write,
        }
    }

    /// Whether this is the "no rows" outcome rather than a real failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, PipelineError::EmptyResult)
    }

    pub fn hint(&self) -> &'static str {
        REMEDIATION_HINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let fetch = PipelineError::Fetch(FetchError::Malformed("bad".to_string()));
        assert_eq!(fetch.stage(), Stage::Load);
        assert_eq!(PipelineError::EmptyResult.stage(), Stage::Load);
        assert_eq!(
            PipelineError::InvalidPattern("(".to_string()).stage(),
            Stage::Normalize
        );
        assert_eq!(PipelineError::Render("x".to_string()).stage(), Stage::Render);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PipelineError::EmptyResult.to_string(),
            "No data found in the spreadsheet"
        );
        let err = PipelineError::Fetch(FetchError::Malformed("found record with 3 fields".into()));
        assert_eq!(err.to_string(), "malformed CSV: found record with 3 fields");
        assert!(PipelineError::EmptyResult.is_empty_result());
        assert!(!err.is_empty_result());
        assert_eq!(err.hint(), REMEDIATION_HINT);
    }
}
